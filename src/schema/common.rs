use poem_openapi::Object;
use serde::Deserialize;

use crate::core::error::ProfileError;

#[derive(Object, Deserialize, Debug)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl From<&ProfileError> for ErrorResponse {
    fn from(err: &ProfileError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

#[derive(Object, Deserialize, Debug)]
pub struct BadGatewayResponse {
    pub message: String,
    pub retryable: bool,
}

impl From<&ProfileError> for BadGatewayResponse {
    fn from(err: &ProfileError) -> Self {
        Self {
            message: err.to_string(),
            retryable: true,
        }
    }
}
