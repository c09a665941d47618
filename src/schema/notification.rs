use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::Deserialize;

use super::common::{BadGatewayResponse, ErrorResponse};
use crate::{
    model::notification_preferences::NotificationPreferences,
    store::notification_panel::NotificationView,
};

#[derive(Object, Deserialize, Debug)]
pub struct DetailNotificationSettings {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
    pub price_alerts: bool,
    pub weather_alerts: bool,
    pub government_updates: bool,
    pub market_insights: bool,
}

impl From<NotificationPreferences> for DetailNotificationSettings {
    fn from(prefs: NotificationPreferences) -> Self {
        Self {
            email: prefs.email,
            push: prefs.push,
            sms: prefs.sms,
            price_alerts: prefs.price_alerts,
            weather_alerts: prefs.weather_alerts,
            government_updates: prefs.government_updates,
            market_insights: prefs.market_insights,
        }
    }
}

#[derive(Object, Deserialize, Debug)]
pub struct NotificationViewResponse {
    pub settings: DetailNotificationSettings,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub saving: bool,
}

impl From<NotificationView> for NotificationViewResponse {
    fn from(view: NotificationView) -> Self {
        Self {
            settings: view.preferences.into(),
            error: view.error,
            notice: view.notice,
            saving: view.saving,
        }
    }
}

#[derive(ApiResponse)]
pub enum GetNotificationResponses {
    #[oai(status = 200)]
    Ok(Json<NotificationViewResponse>),

    #[oai(status = 502)]
    BadGateway(Json<BadGatewayResponse>),
}

#[derive(ApiResponse)]
pub enum ToggleNotificationResponses {
    #[oai(status = 200)]
    Ok(Json<NotificationViewResponse>),

    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
}

#[derive(ApiResponse)]
pub enum SaveNotificationResponses {
    #[oai(status = 200)]
    Ok(Json<NotificationViewResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    #[oai(status = 502)]
    BadGateway(Json<BadGatewayResponse>),
}
