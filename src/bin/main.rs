use std::{str::FromStr, sync::Arc};

use krishi_portal::{init_app_state, init_openapi_route, settings::get_config};
use poem::listener::TcpListener;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config()?;
    let log_level = Level::from_str(&config.log_level).unwrap_or(Level::DEBUG);
    // Logging to File
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(log_level)
        .init();

    // Logging to Console
    // tracing_subscriber::fmt().with_max_level(log_level).init();

    tracing::info!("{}", config.env_source());
    tracing::info!("run with config: {:?}", config);

    // Init session, gateways and page state
    let app_state = Arc::new(init_app_state(&config).await?);
    // Load the profile once at startup, like the page does on mount
    if let Err(err) = app_state.page.profile.load_session_profile().await {
        tracing::warn!("initial profile load failed: {}", err);
    }
    if let Err(err) = app_state.page.notifications.load().await {
        tracing::warn!("initial notification settings load failed: {}", err);
    }

    let app = init_openapi_route(app_state.clone(), &config);
    tracing::info!("run server on {}:{}", config.host, config.port);
    poem::Server::new(TcpListener::bind(format!(
        "{}:{}",
        config.host, config.port
    )))
    .run(app)
    .await?;
    Ok(())
}
