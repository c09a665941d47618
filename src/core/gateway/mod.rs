//! Remote data gateway: the record store and object storage the profile page
//! talks to. The workflows only see these traits; adapters live in the
//! submodules.

use async_trait::async_trait;

use crate::{
    core::error::GatewayError,
    model::{
        notification_preferences::NotificationPreferencesRecord,
        profile::{Profile, ProfileUpsert},
    },
};

pub mod filesystem;
pub mod memory;
pub mod postgres;

pub const AVATAR_BUCKET: &str = "avatars";

/// Relational side of the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Fetch the single profile row for `user_id`; `NotFound` when zero rows
    /// match.
    async fn select_profile(&self, user_id: &str) -> Result<Profile, GatewayError>;

    /// Insert or update the profile keyed on `user_id`, writing only the
    /// columns the upsert carries. Returns the stored row.
    async fn upsert_profile(&self, record: &ProfileUpsert) -> Result<Profile, GatewayError>;

    async fn select_notification_preferences(
        &self,
        user_id: &str,
    ) -> Result<NotificationPreferencesRecord, GatewayError>;

    async fn upsert_notification_preferences(
        &self,
        record: &NotificationPreferencesRecord,
    ) -> Result<NotificationPreferencesRecord, GatewayError>;
}

/// Object storage side of the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageGateway: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), GatewayError>;

    /// Public URL for a stored object. Pure string work, nothing is fetched.
    fn public_url(&self, bucket: &str, key: &str) -> String;
}

/// Public URL layout of the object store:
/// `<base>/storage/v1/object/public/<bucket>/<key>`.
pub fn build_public_url(base: &str, bucket: &str, key: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        base.trim_end_matches('/'),
        bucket,
        key
    )
}
