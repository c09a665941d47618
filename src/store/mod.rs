//! Stateful adapters behind the profile page: the profile form, the avatar
//! upload and the notification toggles. Each one owns its view state and
//! talks to the backend only through the gateway traits.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use crate::core::{
    gateway::{RecordGateway, StorageGateway},
    session::SessionProvider,
};

pub mod avatar_upload;
pub mod notification_panel;
pub mod profile_store;

use avatar_upload::AvatarUpload;
use notification_panel::NotificationPanel;
use profile_store::ProfileStore;

/// Clears a busy flag when dropped, so every exit path of an operation
/// (success, error, early return) leaves the flag reset.
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Raise `flag`; `None` when it was already raised.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(Self { flag })
    }

}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Counts one running call of an operation that may overlap with itself.
/// The count only reaches zero once the last overlapping call is done.
pub(crate) struct InFlightGuard<'a> {
    count: &'a AtomicUsize,
}

impl<'a> InFlightGuard<'a> {
    pub(crate) fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self { count }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Everything the profile page needs, wired once at startup.
pub struct ProfilePage {
    pub session: Arc<SessionProvider>,
    pub profile: Arc<ProfileStore>,
    pub avatar: AvatarUpload,
    pub notifications: NotificationPanel,
}

impl ProfilePage {
    pub fn new(
        session: Arc<SessionProvider>,
        records: Arc<dyn RecordGateway>,
        storage: Arc<dyn StorageGateway>,
        max_avatar_bytes: usize,
    ) -> Self {
        let profile = Arc::new(ProfileStore::new(
            session.clone(),
            records.clone(),
            storage.clone(),
        ));
        let avatar = AvatarUpload::new(
            session.clone(),
            records.clone(),
            storage,
            profile.clone(),
            max_avatar_bytes,
        );
        let notifications = NotificationPanel::new(session.clone(), records);
        Self {
            session,
            profile,
            avatar,
            notifications,
        }
    }
}
