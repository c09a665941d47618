use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const TABLE_NAME: &str = "public.notification_preferences";

/// Channel and category toggles of the notifications tab. Every field is
/// independent of the others.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
    pub price_alerts: bool,
    pub weather_alerts: bool,
    pub government_updates: bool,
    pub market_insights: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
            price_alerts: true,
            weather_alerts: true,
            government_updates: true,
            market_insights: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationSetting {
    Email,
    Push,
    Sms,
    PriceAlerts,
    WeatherAlerts,
    GovernmentUpdates,
    MarketInsights,
}

impl NotificationSetting {
    pub const ALL: [NotificationSetting; 7] = [
        NotificationSetting::Email,
        NotificationSetting::Push,
        NotificationSetting::Sms,
        NotificationSetting::PriceAlerts,
        NotificationSetting::WeatherAlerts,
        NotificationSetting::GovernmentUpdates,
        NotificationSetting::MarketInsights,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationSetting::Email => "email",
            NotificationSetting::Push => "push",
            NotificationSetting::Sms => "sms",
            NotificationSetting::PriceAlerts => "price_alerts",
            NotificationSetting::WeatherAlerts => "weather_alerts",
            NotificationSetting::GovernmentUpdates => "government_updates",
            NotificationSetting::MarketInsights => "market_insights",
        }
    }
}

impl fmt::Display for NotificationSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationSetting {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationSetting::ALL
            .into_iter()
            .find(|setting| setting.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown notification setting: {s}"))
    }
}

impl NotificationPreferences {
    pub fn get(&self, setting: NotificationSetting) -> bool {
        match setting {
            NotificationSetting::Email => self.email,
            NotificationSetting::Push => self.push,
            NotificationSetting::Sms => self.sms,
            NotificationSetting::PriceAlerts => self.price_alerts,
            NotificationSetting::WeatherAlerts => self.weather_alerts,
            NotificationSetting::GovernmentUpdates => self.government_updates,
            NotificationSetting::MarketInsights => self.market_insights,
        }
    }

    fn field_mut(&mut self, setting: NotificationSetting) -> &mut bool {
        match setting {
            NotificationSetting::Email => &mut self.email,
            NotificationSetting::Push => &mut self.push,
            NotificationSetting::Sms => &mut self.sms,
            NotificationSetting::PriceAlerts => &mut self.price_alerts,
            NotificationSetting::WeatherAlerts => &mut self.weather_alerts,
            NotificationSetting::GovernmentUpdates => &mut self.government_updates,
            NotificationSetting::MarketInsights => &mut self.market_insights,
        }
    }

    /// Flip one toggle and return its new value.
    pub fn toggle(&mut self, setting: NotificationSetting) -> bool {
        let field = self.field_mut(setting);
        *field = !*field;
        *field
    }
}

/// Persisted row: the seven toggles keyed by user id.
#[derive(Clone, Debug, Deserialize, Serialize, FromRow, PartialEq, Eq)]
pub struct NotificationPreferencesRecord {
    pub user_id: String,
    pub email: bool,
    pub push: bool,
    pub sms: bool,
    pub price_alerts: bool,
    pub weather_alerts: bool,
    pub government_updates: bool,
    pub market_insights: bool,
    pub updated_at: DateTime<FixedOffset>,
}

impl NotificationPreferencesRecord {
    pub fn new(
        user_id: &str,
        preferences: NotificationPreferences,
        updated_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: preferences.email,
            push: preferences.push,
            sms: preferences.sms,
            price_alerts: preferences.price_alerts,
            weather_alerts: preferences.weather_alerts,
            government_updates: preferences.government_updates,
            market_insights: preferences.market_insights,
            updated_at,
        }
    }

    pub fn preferences(&self) -> NotificationPreferences {
        NotificationPreferences {
            email: self.email,
            push: self.push,
            sms: self.sms,
            price_alerts: self.price_alerts,
            weather_alerts: self.weather_alerts,
            government_updates: self.government_updates,
            market_insights: self.market_insights,
        }
    }
}
