use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use tracing::warn;

use crate::{
    core::error::ProfileError,
    model::notification_preferences::NotificationSetting,
    schema::{
        common::{BadGatewayResponse, ErrorResponse},
        notification::{
            GetNotificationResponses, SaveNotificationResponses, ToggleNotificationResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiNotificationTags {
    Notification,
}

pub struct ApiNotification;

#[OpenApi]
impl ApiNotification {
    #[oai(
        path = "/notifications",
        method = "get",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn get_notifications_api(&self, state: Data<&Arc<AppState>>) -> GetNotificationResponses {
        GetNotificationResponses::Ok(Json(state.page.notifications.view().await.into()))
    }

    #[oai(
        path = "/notifications/load",
        method = "post",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn load_notifications_api(
        &self,
        state: Data<&Arc<AppState>>,
    ) -> GetNotificationResponses {
        if let Err(err) = state.page.notifications.load().await {
            warn!("route.notification load_notifications_api: {}", err);
            return GetNotificationResponses::BadGateway(Json(BadGatewayResponse::from(&err)));
        }
        GetNotificationResponses::Ok(Json(state.page.notifications.view().await.into()))
    }

    #[oai(
        path = "/notifications/toggle",
        method = "post",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn toggle_notification_api(
        &self,
        Query(setting): Query<String>,
        state: Data<&Arc<AppState>>,
    ) -> ToggleNotificationResponses {
        let setting = match setting.parse::<NotificationSetting>() {
            Ok(val) => val,
            Err(err) => {
                let message = err.to_string();
                return ToggleNotificationResponses::BadRequest(Json(ErrorResponse::new(&message)));
            }
        };
        state.page.notifications.toggle(setting).await;
        ToggleNotificationResponses::Ok(Json(state.page.notifications.view().await.into()))
    }

    #[oai(
        path = "/notifications",
        method = "put",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn save_notifications_api(
        &self,
        state: Data<&Arc<AppState>>,
    ) -> SaveNotificationResponses {
        match state.page.notifications.save().await {
            Ok(_) => {
                SaveNotificationResponses::Ok(Json(state.page.notifications.view().await.into()))
            }
            Err(err @ ProfileError::Validation(_)) => {
                SaveNotificationResponses::Unauthorized(Json(ErrorResponse::from(&err)))
            }
            Err(err) => SaveNotificationResponses::BadGateway(Json(BadGatewayResponse::from(&err))),
        }
    }
}
