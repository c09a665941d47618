use std::sync::Arc;

use crate::{
    core::{gateway::memory::InMemoryGateway, session::SessionProvider},
    settings::{Config, GatewayKind},
    AppState,
};

pub struct TestApp {
    pub state: Arc<AppState>,
    pub gateway: Arc<InMemoryGateway>,
    pub config: Config,
}

pub fn test_config() -> Config {
    Config {
        prefix: Some("/api".to_string()),
        gateway: GatewayKind::Memory,
        storage_public_url: "http://cdn.local".to_string(),
        max_avatar_bytes: 1024,
        ..Config::default()
    }
}

/// App state over an in-memory gateway. `None` runs without a session user.
pub fn generate_test_app(user_id: Option<&str>) -> TestApp {
    let config = test_config();
    let session = match user_id {
        Some(id) => SessionProvider::demo(id, &format!("{id}@example.com")),
        None => SessionProvider::anonymous(),
    };
    let gateway = Arc::new(InMemoryGateway::new(&config.storage_public_url));
    let state = Arc::new(AppState::new(
        Arc::new(session),
        gateway.clone(),
        gateway.clone(),
        &config,
    ));
    TestApp {
        state,
        gateway,
        config,
    }
}

#[cfg(test)]
mod tests {
    use super::generate_test_app;

    #[tokio::test]
    async fn test_generate_test_app() {
        let app = generate_test_app(Some("u1"));
        assert_eq!(app.state.page.session.user_id(), Some("u1"));
        assert_eq!(app.gateway.profile_count().await, 0);

        let anonymous = generate_test_app(None);
        assert_eq!(anonymous.state.page.session.user_id(), None);
    }
}
