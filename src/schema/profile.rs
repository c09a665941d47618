use poem_openapi::{payload::Json, types::multipart::Upload, ApiResponse, Multipart, Object};
use serde::Deserialize;

use super::common::{BadGatewayResponse, ErrorResponse};
use crate::{
    core::utils::datetime_to_string,
    model::profile::{Profile, ProfileForm},
};

#[derive(Object, Deserialize, Debug)]
pub struct DetailProfile {
    pub user_id: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_at: String,
}

impl From<Profile> for DetailProfile {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.user_id,
            full_name: profile.full_name,
            phone_number: profile.phone_number,
            location: profile.location,
            avatar_url: profile.avatar_url,
            updated_at: datetime_to_string(profile.updated_at),
        }
    }
}

#[derive(Object, Deserialize, Debug)]
pub struct DetailProfileForm {
    pub full_name: String,
    pub phone_number: String,
    pub location: String,
}

impl From<ProfileForm> for DetailProfileForm {
    fn from(form: ProfileForm) -> Self {
        Self {
            full_name: form.full_name,
            phone_number: form.phone_number,
            location: form.location,
        }
    }
}

#[derive(Object, Deserialize, Debug)]
pub struct ProfileViewResponse {
    pub status: String,
    pub email: Option<String>,
    pub profile: Option<DetailProfile>,
    pub form: DetailProfileForm,
    pub avatar_public_url: Option<String>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub loading: bool,
    pub uploading: bool,
    pub upload_phase: String,
}

#[derive(ApiResponse)]
pub enum GetProfileResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileViewResponse>),
}

#[derive(ApiResponse)]
pub enum LoadProfileResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileViewResponse>),

    #[oai(status = 502)]
    BadGateway(Json<BadGatewayResponse>),
}

/// Fields left out keep their current form value.
#[derive(Object, Deserialize, Debug)]
pub struct ProfileUpdateRequest {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
}

#[derive(ApiResponse)]
pub enum ProfileUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileViewResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    #[oai(status = 502)]
    BadGateway(Json<BadGatewayResponse>),
}

#[derive(Multipart)]
pub struct AvatarUploadRequest {
    pub file: Option<Upload>,
}

#[derive(Object, Deserialize, Debug)]
pub struct AvatarUploadResponse {
    pub key: String,
    pub public_url: String,
}

#[derive(ApiResponse)]
pub enum AvatarUploadResponses {
    #[oai(status = 200)]
    Ok(Json<AvatarUploadResponse>),

    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    #[oai(status = 409)]
    Conflict(Json<ErrorResponse>),

    #[oai(status = 502)]
    BadGateway(Json<BadGatewayResponse>),
}
