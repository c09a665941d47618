use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};
use tracing::warn;

use crate::{
    core::error::ProfileError,
    model::profile::ProfileForm,
    schema::{
        common::{BadGatewayResponse, ErrorResponse},
        profile::{
            AvatarUploadRequest, AvatarUploadResponse, AvatarUploadResponses, GetProfileResponses,
            LoadProfileResponses, ProfileUpdateRequest, ProfileUpdateResponses,
            ProfileViewResponse,
        },
    },
    store::{
        avatar_upload::{AvatarFile, UploadOutcome},
        ProfilePage,
    },
    AppState,
};

#[derive(Tags)]
enum ApiProfileTags {
    Profile,
}

pub struct ApiProfile;

pub async fn profile_view(page: &ProfilePage) -> ProfileViewResponse {
    let view = page.profile.view().await;
    let session = page.session.get_session();
    ProfileViewResponse {
        status: view.status.as_str().to_string(),
        email: session.user.as_ref().map(|user| user.email.clone()),
        profile: view.profile.map(Into::into),
        form: view.form.into(),
        avatar_public_url: page.profile.avatar_public_url().await,
        error: view.error,
        notice: view.notice,
        loading: view.loading,
        uploading: page.avatar.is_uploading(),
        upload_phase: page.avatar.phase().as_str().to_string(),
    }
}

#[OpenApi]
impl ApiProfile {
    #[oai(path = "/profile", method = "get", tag = "ApiProfileTags::Profile")]
    async fn get_profile_api(&self, state: Data<&Arc<AppState>>) -> GetProfileResponses {
        GetProfileResponses::Ok(Json(profile_view(&state.page).await))
    }

    #[oai(
        path = "/profile/load",
        method = "post",
        tag = "ApiProfileTags::Profile"
    )]
    async fn load_profile_api(&self, state: Data<&Arc<AppState>>) -> LoadProfileResponses {
        if let Err(err) = state.page.profile.load_session_profile().await {
            warn!("route.profile load_profile_api: {}", err);
            return LoadProfileResponses::BadGateway(Json(BadGatewayResponse::from(&err)));
        }
        LoadProfileResponses::Ok(Json(profile_view(&state.page).await))
    }

    #[oai(path = "/profile", method = "put", tag = "ApiProfileTags::Profile")]
    async fn update_profile_api(
        &self,
        json: Json<ProfileUpdateRequest>,
        state: Data<&Arc<AppState>>,
    ) -> ProfileUpdateResponses {
        let current = state.page.profile.view().await.form;
        let form = ProfileForm {
            full_name: json.full_name.clone().unwrap_or(current.full_name),
            phone_number: json.phone_number.clone().unwrap_or(current.phone_number),
            location: json.location.clone().unwrap_or(current.location),
        };
        state.page.profile.set_form(form.clone()).await;

        match state.page.profile.save_profile(form).await {
            Ok(_) => ProfileUpdateResponses::Ok(Json(profile_view(&state.page).await)),
            Err(err @ ProfileError::Validation(_)) => {
                ProfileUpdateResponses::Unauthorized(Json(ErrorResponse::from(&err)))
            }
            Err(err) => ProfileUpdateResponses::BadGateway(Json(BadGatewayResponse::from(&err))),
        }
    }

    #[oai(
        path = "/profile/avatar",
        method = "post",
        tag = "ApiProfileTags::Profile"
    )]
    async fn upload_avatar_api(
        &self,
        payload: AvatarUploadRequest,
        state: Data<&Arc<AppState>>,
    ) -> AvatarUploadResponses {
        let file = match payload.file {
            Some(upload) => {
                let max_bytes = state.page.avatar.max_bytes();
                if upload.size() > max_bytes {
                    let err = ProfileError::file_too_large(max_bytes);
                    warn!("route.profile upload_avatar_api: {}", err);
                    state.page.profile.report_error(&err).await;
                    return AvatarUploadResponses::BadRequest(Json(ErrorResponse::from(&err)));
                }
                let file_name = upload.file_name().unwrap_or_default().to_string();
                let content_type = upload.content_type().map(str::to_string);
                let bytes = match upload.into_vec().await {
                    Ok(val) => val,
                    Err(err) => {
                        let err = ProfileError::InvalidInput(err.to_string());
                        return AvatarUploadResponses::BadRequest(Json(ErrorResponse::from(&err)));
                    }
                };
                Some(AvatarFile {
                    file_name,
                    content_type,
                    bytes,
                })
            }
            None => None,
        };

        match state.page.avatar.upload(file).await {
            Ok(UploadOutcome::Linked { key, public_url }) => {
                AvatarUploadResponses::Ok(Json(AvatarUploadResponse { key, public_url }))
            }
            Ok(UploadOutcome::Ignored) => {
                let message = "An avatar upload is already in progress.";
                AvatarUploadResponses::Conflict(Json(ErrorResponse::new(message)))
            }
            Err(err @ ProfileError::InvalidInput(_)) => {
                AvatarUploadResponses::BadRequest(Json(ErrorResponse::from(&err)))
            }
            Err(err @ ProfileError::Validation(_)) => {
                AvatarUploadResponses::Unauthorized(Json(ErrorResponse::from(&err)))
            }
            Err(err) => AvatarUploadResponses::BadGateway(Json(BadGatewayResponse::from(&err))),
        }
    }
}
