use thiserror::Error;

/// Failures reported by a gateway adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("no rows returned")]
    NotFound,
    #[error("network error: {0}")]
    Network(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl GatewayError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => GatewayError::NotFound,
            other => GatewayError::Network(other.to_string()),
        }
    }
}

/// Failures surfaced by the profile page workflows. The `Display` output is
/// the single message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("profile not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Storage(String),
    #[error("{0}")]
    InvalidInput(String),
}

impl ProfileError {
    pub fn no_user() -> Self {
        Self::Validation("No user logged in".to_string())
    }

    pub fn no_file() -> Self {
        Self::InvalidInput("You must select an image to upload.".to_string())
    }

    pub fn file_too_large(max_bytes: usize) -> Self {
        Self::InvalidInput(format!("Avatar must be at most {} bytes.", max_bytes))
    }
}

impl From<GatewayError> for ProfileError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound => ProfileError::NotFound,
            GatewayError::Network(message) => ProfileError::Network(message),
            GatewayError::Storage(message) => ProfileError::Storage(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: GatewayError = sqlx::Error::RowNotFound.into();
        assert_eq!(err, GatewayError::NotFound);
    }

    #[test]
    fn test_pool_errors_map_to_network() {
        let err: GatewayError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, GatewayError::Network(_)));
    }

    #[test]
    fn test_gateway_error_keeps_kind() {
        assert_eq!(
            ProfileError::from(GatewayError::storage("quota exceeded")),
            ProfileError::Storage("quota exceeded".to_string())
        );
        assert_eq!(ProfileError::no_user().to_string(), "No user logged in");
    }
}
