pub mod notification_preferences;
pub mod profile;
