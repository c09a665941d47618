use std::sync::{
    atomic::{AtomicBool, AtomicU8, Ordering},
    Arc,
};

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use super::{profile_store::ProfileStore, BusyGuard};
use crate::{
    core::{
        error::ProfileError,
        gateway::{RecordGateway, StorageGateway, AVATAR_BUCKET},
        session::SessionProvider,
    },
    model::profile::ProfileUpsert,
};

/// A file picked by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadPhase {
    Idle,
    Uploading,
    LinkingToProfile,
}

impl UploadPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadPhase::Idle => "idle",
            UploadPhase::Uploading => "uploading",
            UploadPhase::LinkingToProfile => "linking_to_profile",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => UploadPhase::Uploading,
            2 => UploadPhase::LinkingToProfile,
            _ => UploadPhase::Idle,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Stored and linked into the profile.
    Linked { key: String, public_url: String },
    /// Another upload was still running; this selection was dropped.
    Ignored,
}

/// Storage key for an avatar: `<user_id>-<token>.<extension>`. The extension
/// is whatever follows the last dot of the original name, or the whole name
/// when there is no dot.
pub fn derive_avatar_key(user_id: &str, file_name: &str, token: f64) -> String {
    format!("{}-{}.{}", user_id, token, avatar_extension(file_name))
}

fn avatar_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => file_name,
    }
}

/// Random fraction in `[0, 1)` used to keep keys apart. Not meant to be
/// unguessable.
pub fn random_token() -> f64 {
    rand::random::<f64>()
}

pub struct AvatarUpload {
    session: Arc<SessionProvider>,
    records: Arc<dyn RecordGateway>,
    storage: Arc<dyn StorageGateway>,
    profile: Arc<ProfileStore>,
    max_bytes: usize,
    uploading: AtomicBool,
    phase: AtomicU8,
}

/// Puts the phase back to idle however the upload ends.
struct PhaseReset<'a>(&'a AtomicU8);

impl Drop for PhaseReset<'_> {
    fn drop(&mut self) {
        self.0.store(UploadPhase::Idle as u8, Ordering::SeqCst);
    }
}

impl AvatarUpload {
    pub fn new(
        session: Arc<SessionProvider>,
        records: Arc<dyn RecordGateway>,
        storage: Arc<dyn StorageGateway>,
        profile: Arc<ProfileStore>,
        max_bytes: usize,
    ) -> Self {
        Self {
            session,
            records,
            storage,
            profile,
            max_bytes,
            uploading: AtomicBool::new(false),
            phase: AtomicU8::new(UploadPhase::Idle as u8),
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> UploadPhase {
        UploadPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    fn set_phase(&self, phase: UploadPhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }

    /// Store `file` and link it as the session user's avatar. Any failure is
    /// recorded as the page error and leaves `avatar_url` as it was.
    pub async fn upload(&self, file: Option<AvatarFile>) -> Result<UploadOutcome, ProfileError> {
        let Some(_uploading) = BusyGuard::acquire(&self.uploading) else {
            info!("avatar upload already in flight, ignoring selection");
            return Ok(UploadOutcome::Ignored);
        };
        let _phase = PhaseReset(&self.phase);
        self.profile.clear_messages().await;

        let res = self.store_and_link(file).await;
        if let Err(err) = &res {
            warn!("avatar upload failed: {}", err);
            self.profile.report_error(err).await;
        }
        res
    }

    async fn store_and_link(
        &self,
        file: Option<AvatarFile>,
    ) -> Result<UploadOutcome, ProfileError> {
        let file = file.ok_or_else(ProfileError::no_file)?;
        let content_type = self.validate(&file)?;
        let user_id = self.session.user_id().ok_or_else(ProfileError::no_user)?;
        let key = derive_avatar_key(user_id, &file.file_name, random_token());

        self.set_phase(UploadPhase::Uploading);
        info!("uploading avatar {} ({} bytes)", key, file.bytes.len());
        self.storage
            .upload(AVATAR_BUCKET, &key, &file.bytes, content_type)
            .await?;

        self.set_phase(UploadPhase::LinkingToProfile);
        let mut link = ProfileUpsert::new(user_id);
        link.avatar_url = Some(key.clone());
        link.updated_at = Some(Local::now().fixed_offset());
        let profile = self.records.upsert_profile(&link).await?;
        self.profile.replace_profile(profile).await;

        let public_url = self.storage.public_url(AVATAR_BUCKET, &key);
        info!("linked avatar {} for {}", key, user_id);
        Ok(UploadOutcome::Linked { key, public_url })
    }

    fn validate<'a>(&self, file: &'a AvatarFile) -> Result<&'a str, ProfileError> {
        let content_type = file.content_type.as_deref().unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(ProfileError::InvalidInput(
                "Avatar must be an image file.".to_string(),
            ));
        }
        let extension = avatar_extension(&file.file_name);
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProfileError::InvalidInput(
                "Avatar file name must end in a plain extension like .png.".to_string(),
            ));
        }
        if file.bytes.is_empty() {
            return Err(ProfileError::InvalidInput(
                "The selected file is empty.".to_string(),
            ));
        }
        if file.bytes.len() > self.max_bytes {
            return Err(ProfileError::file_too_large(self.max_bytes));
        }
        Ok(content_type)
    }
}
