use std::path::Path;

use crate::{
    model::profile::ProfileForm,
    store::{
        avatar_upload::{AvatarFile, UploadOutcome},
        ProfilePage,
    },
};

/// Content type from the file extension; only image types are recognised.
pub fn guess_image_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

pub async fn show_profile(page: &ProfilePage) -> anyhow::Result<String> {
    page.profile.load_session_profile().await?;
    let view = page.profile.view().await;
    let mut out = serde_json::to_value(&view)?;
    out["avatar_public_url"] = serde_json::to_value(page.profile.avatar_public_url().await)?;
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Load the stored profile, overlay the given fields and save.
pub async fn save_profile(
    page: &ProfilePage,
    full_name: Option<String>,
    phone_number: Option<String>,
    location: Option<String>,
) -> anyhow::Result<String> {
    page.profile.load_session_profile().await?;
    let current = page.profile.view().await.form;
    let form = ProfileForm {
        full_name: full_name.unwrap_or(current.full_name),
        phone_number: phone_number.unwrap_or(current.phone_number),
        location: location.unwrap_or(current.location),
    };
    let profile = page.profile.save_profile(form).await?;
    Ok(serde_json::to_string_pretty(&profile)?)
}

pub async fn upload_avatar(
    page: &ProfilePage,
    path: &Path,
    content_type: Option<String>,
) -> anyhow::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    let file = AvatarFile {
        file_name: path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string(),
        content_type: content_type
            .or_else(|| guess_image_content_type(path).map(str::to_string)),
        bytes,
    };
    match page.avatar.upload(Some(file)).await? {
        UploadOutcome::Linked { key, public_url } => Ok(format!("{key}\n{public_url}")),
        UploadOutcome::Ignored => anyhow::bail!("an avatar upload is already in progress"),
    }
}
