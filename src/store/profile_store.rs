use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use chrono::Local;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::InFlightGuard;
use crate::{
    core::{
        error::ProfileError,
        gateway::{RecordGateway, StorageGateway, AVATAR_BUCKET},
        session::SessionProvider,
    },
    model::profile::{Profile, ProfileForm, ProfileUpsert},
};

pub const SAVED_NOTICE: &str = "Profile updated successfully";

/// Outcome of the latest load. `Loading` until the first load has finished.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Loading,
    Loaded,
    Error,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::Loading => "loading",
            ProfileStatus::Loaded => "loaded",
            ProfileStatus::Error => "error",
        }
    }
}

#[derive(Clone, Debug)]
struct ProfileState {
    status: ProfileStatus,
    profile: Option<Profile>,
    form: ProfileForm,
    error: Option<String>,
    notice: Option<String>,
}

/// Snapshot of the profile tab handed to the presentation layer.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ProfileView {
    pub status: ProfileStatus,
    pub profile: Option<Profile>,
    pub form: ProfileForm,
    pub error: Option<String>,
    pub notice: Option<String>,
    /// True while nothing has been loaded yet or a fetch is running.
    pub loading: bool,
}

pub struct ProfileStore {
    session: Arc<SessionProvider>,
    records: Arc<dyn RecordGateway>,
    storage: Arc<dyn StorageGateway>,
    state: RwLock<ProfileState>,
    fetches: AtomicUsize,
}

impl ProfileStore {
    pub fn new(
        session: Arc<SessionProvider>,
        records: Arc<dyn RecordGateway>,
        storage: Arc<dyn StorageGateway>,
    ) -> Self {
        Self {
            session,
            records,
            storage,
            state: RwLock::new(ProfileState {
                status: ProfileStatus::Loading,
                profile: None,
                form: ProfileForm::default(),
                error: None,
                notice: None,
            }),
            fetches: AtomicUsize::new(0),
        }
    }

    pub async fn view(&self) -> ProfileView {
        let state = self.state.read().await;
        ProfileView {
            status: state.status,
            profile: state.profile.clone(),
            form: state.form.clone(),
            error: state.error.clone(),
            notice: state.notice.clone(),
            loading: self.loading_with(&state),
        }
    }

    pub async fn is_loading(&self) -> bool {
        let state = self.state.read().await;
        self.loading_with(&state)
    }

    fn loading_with(&self, state: &ProfileState) -> bool {
        state.status == ProfileStatus::Loading || self.fetches.load(Ordering::SeqCst) > 0
    }

    /// Fetch the stored profile of `user_id` and copy its text fields into
    /// the form. A missing row is a fresh user: the view ends up loaded with
    /// an empty form and no error, and `NotFound` is still returned so the
    /// caller can tell the two apart.
    pub async fn load_profile(&self, user_id: &str) -> Result<Profile, ProfileError> {
        let _fetch = InFlightGuard::enter(&self.fetches);
        match self.records.select_profile(user_id).await {
            Ok(profile) => {
                info!("loaded profile for {}", user_id);
                let mut state = self.state.write().await;
                state.form = ProfileForm::from(&profile);
                state.profile = Some(profile.clone());
                state.status = ProfileStatus::Loaded;
                state.error = None;
                Ok(profile)
            }
            Err(err) => {
                let err = ProfileError::from(err);
                let mut state = self.state.write().await;
                if err == ProfileError::NotFound {
                    info!("no profile yet for {}", user_id);
                    state.form = ProfileForm::default();
                    state.profile = None;
                    state.status = ProfileStatus::Loaded;
                    state.error = None;
                } else {
                    warn!("loading profile for {} failed: {}", user_id, err);
                    state.status = ProfileStatus::Error;
                    state.error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Load the profile of the session user. Without a session user there is
    /// nothing to fetch and the view is settled as loaded and empty.
    pub async fn load_session_profile(&self) -> Result<Option<Profile>, ProfileError> {
        let Some(user_id) = self.session.user_id() else {
            self.state.write().await.status = ProfileStatus::Loaded;
            return Ok(None);
        };
        match self.load_profile(user_id).await {
            Ok(profile) => Ok(Some(profile)),
            Err(ProfileError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Replace the editable fields without touching the backend.
    pub async fn set_form(&self, form: ProfileForm) {
        self.state.write().await.form = form;
    }

    /// Upsert `form` for the session user and refresh the view from the
    /// stored row. Fails with a validation error, before any gateway call,
    /// when there is no session user. On failure the view keeps its previous
    /// profile and form and carries the error message.
    pub async fn save_profile(&self, form: ProfileForm) -> Result<Profile, ProfileError> {
        self.clear_messages().await;
        let res = self.upsert_form(&form).await;
        let mut state = self.state.write().await;
        match res {
            Ok(profile) => {
                info!("saved profile for {}", profile.user_id);
                state.form = ProfileForm::from(&profile);
                state.profile = Some(profile.clone());
                state.status = ProfileStatus::Loaded;
                state.notice = Some(SAVED_NOTICE.to_string());
                Ok(profile)
            }
            Err(err) => {
                warn!("saving profile failed: {}", err);
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    async fn upsert_form(&self, form: &ProfileForm) -> Result<Profile, ProfileError> {
        let user_id = self.session.user_id().ok_or_else(ProfileError::no_user)?;
        let record = ProfileUpsert {
            user_id: user_id.to_string(),
            full_name: Some(form.full_name.clone()),
            phone_number: Some(form.phone_number.clone()),
            location: Some(form.location.clone()),
            avatar_url: None,
            updated_at: Some(Local::now().fixed_offset()),
        };
        Ok(self.records.upsert_profile(&record).await?)
    }

    /// Public URL of the linked avatar, resolved on every call.
    pub async fn avatar_public_url(&self) -> Option<String> {
        let state = self.state.read().await;
        let key = state.profile.as_ref()?.avatar_url.as_ref()?;
        Some(self.storage.public_url(AVATAR_BUCKET, key))
    }

    /// Take a freshly stored row (e.g. after the avatar link) as the view.
    pub(crate) async fn replace_profile(&self, profile: Profile) {
        let mut state = self.state.write().await;
        state.form = ProfileForm::from(&profile);
        state.profile = Some(profile);
        state.status = ProfileStatus::Loaded;
    }

    pub(crate) async fn clear_messages(&self) {
        let mut state = self.state.write().await;
        state.error = None;
        state.notice = None;
    }

    pub(crate) async fn report_error(&self, err: &ProfileError) {
        self.state.write().await.error = Some(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        core::{
            error::GatewayError,
            gateway::{memory::InMemoryGateway, MockRecordGateway, MockStorageGateway},
        },
        model::notification_preferences::NotificationPreferencesRecord,
    };

    fn store_with(session: SessionProvider, gateway: Arc<InMemoryGateway>) -> ProfileStore {
        ProfileStore::new(Arc::new(session), gateway.clone(), gateway)
    }

    fn asha() -> ProfileForm {
        ProfileForm {
            full_name: "Asha Patel".to_string(),
            phone_number: "9999999999".to_string(),
            location: String::new(),
        }
    }

    #[tokio::test]
    async fn test_load_missing_profile_is_fresh_user() {
        let gateway = Arc::new(InMemoryGateway::default());
        let store = store_with(SessionProvider::demo("u1", "u1@example.com"), gateway);

        let res = store.load_profile("u1").await;

        assert_eq!(res, Err(ProfileError::NotFound));
        let view = store.view().await;
        assert_eq!(view.status, ProfileStatus::Loaded);
        assert_eq!(view.form, ProfileForm::default());
        assert_eq!(view.profile, None);
        assert_eq!(view.error, None);
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_load_network_failure_sets_error() {
        let gateway = Arc::new(InMemoryGateway::default());
        gateway.fail_select(true);
        let store = store_with(SessionProvider::demo("u1", "u1@example.com"), gateway);

        let res = store.load_profile("u1").await;

        assert!(matches!(res, Err(ProfileError::Network(_))));
        let view = store.view().await;
        assert_eq!(view.status, ProfileStatus::Error);
        assert_eq!(view.error, Some("connection refused".to_string()));
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_save_twice_keeps_one_record() -> anyhow::Result<()> {
        let gateway = Arc::new(InMemoryGateway::default());
        let store = store_with(
            SessionProvider::demo("u1", "u1@example.com"),
            gateway.clone(),
        );

        let first = store.save_profile(asha()).await?;
        let second = store.save_profile(asha()).await?;

        assert_eq!(gateway.profile_count().await, 1);
        assert_eq!(first.full_name, second.full_name);
        assert_eq!(first.phone_number, second.phone_number);
        assert_eq!(store.view().await.notice, Some(SAVED_NOTICE.to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_save_without_session_makes_no_call() {
        let mut records = MockRecordGateway::new();
        records.expect_upsert_profile().times(0);
        records.expect_select_profile().times(0);
        let storage = MockStorageGateway::new();
        let store = ProfileStore::new(
            Arc::new(SessionProvider::anonymous()),
            Arc::new(records),
            Arc::new(storage),
        );

        let res = store.save_profile(asha()).await;

        assert!(matches!(res, Err(ProfileError::Validation(_))));
        assert_eq!(
            store.view().await.error,
            Some("No user logged in".to_string())
        );
    }

    #[tokio::test]
    async fn test_save_failure_keeps_previous_view() -> anyhow::Result<()> {
        let gateway = Arc::new(InMemoryGateway::default());
        let store = store_with(
            SessionProvider::demo("u1", "u1@example.com"),
            gateway.clone(),
        );
        store.save_profile(asha()).await?;
        gateway.fail_upsert(true);

        let mut changed = asha();
        changed.location = "Pune".to_string();
        let res = store.save_profile(changed).await;

        assert!(matches!(res, Err(ProfileError::Network(_))));
        let view = store.view().await;
        assert_eq!(view.form, asha());
        assert_eq!(
            view.profile.and_then(|p| p.location),
            Some(String::new())
        );
        assert!(view.error.is_some());
        assert_eq!(view.notice, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_end_to_end_fresh_user() -> anyhow::Result<()> {
        let gateway = Arc::new(InMemoryGateway::default());
        let store = store_with(
            SessionProvider::demo("u1", "u1@example.com"),
            gateway.clone(),
        );
        assert_eq!(store.load_profile("u1").await, Err(ProfileError::NotFound));

        let before = Local::now().fixed_offset();
        store.set_form(asha()).await;
        let form = store.view().await.form;
        store.save_profile(form).await?;

        let reloaded = store.load_profile("u1").await?;
        assert_eq!(reloaded.full_name, Some("Asha Patel".to_string()));
        assert_eq!(reloaded.phone_number, Some("9999999999".to_string()));
        assert!(reloaded.updated_at >= before);
        Ok(())
    }

    #[tokio::test]
    async fn test_avatar_url_resolved_from_key() -> anyhow::Result<()> {
        let gateway = Arc::new(InMemoryGateway::new("http://cdn.local"));
        let store = store_with(
            SessionProvider::demo("u1", "u1@example.com"),
            gateway.clone(),
        );
        assert_eq!(store.avatar_public_url().await, None);

        let mut link = ProfileUpsert::new("u1");
        link.avatar_url = Some("u1-0.5.png".to_string());
        let row = gateway.upsert_profile(&link).await?;
        store.replace_profile(row).await;

        assert_eq!(
            store.avatar_public_url().await,
            Some("http://cdn.local/storage/v1/object/public/avatars/u1-0.5.png".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_loading_until_first_load() {
        let gateway = Arc::new(InMemoryGateway::default());
        let store = store_with(SessionProvider::demo("u1", "u1@example.com"), gateway);
        let view = store.view().await;
        assert_eq!(view.status, ProfileStatus::Loading);
        assert!(view.loading);
        assert!(store.is_loading().await);

        let _ = store.load_session_profile().await;

        assert_eq!(store.view().await.status, ProfileStatus::Loaded);
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn test_anonymous_session_settles_loaded() {
        let gateway = Arc::new(InMemoryGateway::default());
        let store = store_with(SessionProvider::anonymous(), gateway.clone());

        assert_eq!(store.load_session_profile().await, Ok(None));

        let view = store.view().await;
        assert_eq!(view.status, ProfileStatus::Loaded);
        assert!(!view.loading);
        assert_eq!(gateway.calls(), 0);
    }

    /// Records gateway whose profile selects wait until the test lets one go.
    struct SlowRecords {
        inner: Arc<InMemoryGateway>,
        release: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl RecordGateway for SlowRecords {
        async fn select_profile(&self, user_id: &str) -> Result<Profile, GatewayError> {
            self.release.notified().await;
            self.inner.select_profile(user_id).await
        }

        async fn upsert_profile(&self, record: &ProfileUpsert) -> Result<Profile, GatewayError> {
            self.inner.upsert_profile(record).await
        }

        async fn select_notification_preferences(
            &self,
            user_id: &str,
        ) -> Result<NotificationPreferencesRecord, GatewayError> {
            self.inner.select_notification_preferences(user_id).await
        }

        async fn upsert_notification_preferences(
            &self,
            record: &NotificationPreferencesRecord,
        ) -> Result<NotificationPreferencesRecord, GatewayError> {
            self.inner.upsert_notification_preferences(record).await
        }
    }

    #[tokio::test]
    async fn test_overlapping_loads_keep_loading_until_last() -> anyhow::Result<()> {
        let gateway = Arc::new(InMemoryGateway::default());
        let records = Arc::new(SlowRecords {
            inner: gateway.clone(),
            release: tokio::sync::Notify::new(),
        });
        let store = Arc::new(ProfileStore::new(
            Arc::new(SessionProvider::demo("u1", "u1@example.com")),
            records.clone(),
            gateway,
        ));

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.load_profile("u1").await }
        });
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.load_profile("u1").await }
        });
        while store.fetches.load(Ordering::SeqCst) < 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        records.release.notify_one();
        while !first.is_finished() && !second.is_finished() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let view = store.view().await;
        assert_eq!(view.status, ProfileStatus::Loaded);
        assert!(view.loading);

        records.release.notify_one();
        assert_eq!(first.await?, Err(ProfileError::NotFound));
        assert_eq!(second.await?, Err(ProfileError::NotFound));
        assert!(!store.view().await.loading);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_session_profile_maps_not_found() {
        let mut records = MockRecordGateway::new();
        records
            .expect_select_profile()
            .times(1)
            .returning(|_| Err(GatewayError::NotFound));
        let store = ProfileStore::new(
            Arc::new(SessionProvider::demo("u1", "u1@example.com")),
            Arc::new(records),
            Arc::new(MockStorageGateway::new()),
        );
        assert_eq!(store.load_session_profile().await, Ok(None));
    }
}
