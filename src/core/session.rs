use serde::{Deserialize, Serialize};
use tracing::info;

use crate::settings::Config;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionErrorKind {
    Unauthenticated,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user: Option<SessionUser>,
    pub error: Option<SessionErrorKind>,
}

impl Session {
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.id.as_str())
    }
}

/// Process-wide identity. Built once at startup and handed to every component
/// that needs it; there is no sign-in flow, so the session never changes.
#[derive(Debug)]
pub struct SessionProvider {
    session: Session,
    loading: bool,
}

impl SessionProvider {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            loading: false,
        }
    }

    pub fn demo(user_id: &str, email: &str) -> Self {
        Self::new(Session {
            user: Some(SessionUser {
                id: user_id.to_string(),
                email: email.to_string(),
            }),
            error: None,
        })
    }

    pub fn anonymous() -> Self {
        Self::new(Session {
            user: None,
            error: Some(SessionErrorKind::Unauthenticated),
        })
    }

    /// An empty `DEMO_USER_ID` yields an anonymous session.
    pub fn from_config(config: &Config) -> Self {
        if config.demo_user_id.is_empty() {
            info!("no demo identity configured, running anonymous");
            return Self::anonymous();
        }
        info!("using demo identity {}", config.demo_user_id);
        Self::demo(&config.demo_user_id, &config.demo_user_email)
    }

    pub fn get_session(&self) -> &Session {
        &self.session
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.user_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_session_is_ready() {
        let provider = SessionProvider::from_config(&Config::default());
        assert!(!provider.is_loading());
        assert_eq!(provider.user_id(), Some("mock-user-id"));
        assert_eq!(
            provider.get_session().user.as_ref().map(|u| u.email.as_str()),
            Some("demo@example.com")
        );
        assert_eq!(provider.get_session().error, None);
    }

    #[test]
    fn test_empty_demo_id_is_anonymous() {
        let config = Config {
            demo_user_id: String::new(),
            ..Config::default()
        };
        let provider = SessionProvider::from_config(&config);
        assert_eq!(provider.user_id(), None);
        assert_eq!(
            provider.get_session().error,
            Some(SessionErrorKind::Unauthenticated)
        );
    }
}
