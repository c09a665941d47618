use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use chrono::Local;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::InFlightGuard;
use crate::{
    core::{error::ProfileError, gateway::RecordGateway, session::SessionProvider},
    model::notification_preferences::{
        NotificationPreferences, NotificationPreferencesRecord, NotificationSetting,
    },
};

#[derive(Clone, Debug, Default)]
struct PanelState {
    preferences: NotificationPreferences,
    error: Option<String>,
    notice: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct NotificationView {
    pub preferences: NotificationPreferences,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub saving: bool,
}

pub const SAVED_NOTICE: &str = "Notification settings saved";

/// Local toggle state of the notifications tab.
pub struct NotificationPanel {
    session: Arc<SessionProvider>,
    records: Arc<dyn RecordGateway>,
    state: RwLock<PanelState>,
    saving: AtomicUsize,
}

impl NotificationPanel {
    pub fn new(session: Arc<SessionProvider>, records: Arc<dyn RecordGateway>) -> Self {
        Self {
            session,
            records,
            state: RwLock::new(PanelState::default()),
            saving: AtomicUsize::new(0),
        }
    }

    pub async fn view(&self) -> NotificationView {
        let state = self.state.read().await;
        NotificationView {
            preferences: state.preferences,
            error: state.error.clone(),
            notice: state.notice.clone(),
            saving: self.saving.load(Ordering::SeqCst) > 0,
        }
    }

    pub async fn preferences(&self) -> NotificationPreferences {
        self.state.read().await.preferences
    }

    /// Flip one toggle; the others are left alone.
    pub async fn toggle(&self, setting: NotificationSetting) -> NotificationPreferences {
        let mut state = self.state.write().await;
        let value = state.preferences.toggle(setting);
        state.notice = None;
        debug!("notification setting {} is now {}", setting, value);
        state.preferences
    }

    /// Read the saved toggles of the session user. Users who never saved get
    /// the defaults.
    pub async fn load(&self) -> Result<NotificationPreferences, ProfileError> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(self.preferences().await);
        };
        let res = self.records.select_notification_preferences(user_id).await;
        let mut state = self.state.write().await;
        match res.map_err(ProfileError::from) {
            Ok(record) => {
                state.preferences = record.preferences();
                state.error = None;
            }
            Err(ProfileError::NotFound) => {
                state.preferences = NotificationPreferences::default();
                state.error = None;
            }
            Err(err) => {
                warn!("loading notification settings failed: {}", err);
                state.error = Some(err.to_string());
                return Err(err);
            }
        }
        Ok(state.preferences)
    }

    /// Persist all seven toggles as one record.
    pub async fn save(&self) -> Result<NotificationPreferences, ProfileError> {
        let _saving = InFlightGuard::enter(&self.saving);
        let preferences = {
            let mut state = self.state.write().await;
            state.error = None;
            state.notice = None;
            state.preferences
        };
        let res = match self.session.user_id() {
            Some(user_id) => {
                let record = NotificationPreferencesRecord::new(
                    user_id,
                    preferences,
                    Local::now().fixed_offset(),
                );
                self.records
                    .upsert_notification_preferences(&record)
                    .await
                    .map_err(ProfileError::from)
            }
            None => Err(ProfileError::no_user()),
        };
        let mut state = self.state.write().await;
        match res {
            Ok(record) => {
                info!("saved notification settings for {}", record.user_id);
                state.notice = Some(SAVED_NOTICE.to_string());
                Ok(record.preferences())
            }
            Err(err) => {
                warn!("saving notification settings failed: {}", err);
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gateway::{memory::InMemoryGateway, MockRecordGateway};

    fn panel(gateway: Arc<InMemoryGateway>) -> NotificationPanel {
        NotificationPanel::new(
            Arc::new(SessionProvider::demo("u1", "u1@example.com")),
            gateway,
        )
    }

    #[tokio::test]
    async fn test_starts_with_defaults() {
        let panel = panel(Arc::new(InMemoryGateway::default()));
        assert_eq!(
            panel.preferences().await,
            NotificationPreferences::default()
        );
    }

    #[tokio::test]
    async fn test_toggle_only_changes_one_field() {
        let panel = panel(Arc::new(InMemoryGateway::default()));
        let prefs = panel.toggle(NotificationSetting::Sms).await;
        assert_eq!(
            prefs,
            NotificationPreferences {
                sms: true,
                ..NotificationPreferences::default()
            }
        );
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() -> anyhow::Result<()> {
        let gateway = Arc::new(InMemoryGateway::default());
        let saved = {
            let panel = panel(gateway.clone());
            panel.toggle(NotificationSetting::Sms).await;
            panel.toggle(NotificationSetting::MarketInsights).await;
            let saved = panel.save().await?;
            assert_eq!(panel.view().await.notice, Some(SAVED_NOTICE.to_string()));
            saved
        };

        let fresh = panel(gateway);
        assert_eq!(fresh.load().await?, saved);
        assert!(saved.sms);
        assert!(!saved.market_insights);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_without_record_gives_defaults() -> anyhow::Result<()> {
        let panel = panel(Arc::new(InMemoryGateway::default()));
        panel.toggle(NotificationSetting::Push).await;
        assert_eq!(panel.load().await?, NotificationPreferences::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_failure_keeps_toggles() {
        let gateway = Arc::new(InMemoryGateway::default());
        gateway.fail_upsert(true);
        let panel = panel(gateway);
        panel.toggle(NotificationSetting::Email).await;

        let res = panel.save().await;

        assert!(matches!(res, Err(ProfileError::Network(_))));
        let view = panel.view().await;
        assert!(!view.preferences.email);
        assert!(view.error.is_some());
        assert!(!view.saving);
    }

    #[tokio::test]
    async fn test_save_without_session_makes_no_call() {
        let mut records = MockRecordGateway::new();
        records.expect_upsert_notification_preferences().times(0);
        let panel = NotificationPanel::new(
            Arc::new(SessionProvider::anonymous()),
            Arc::new(records),
        );
        assert_eq!(panel.save().await, Err(ProfileError::no_user()));
    }
}
