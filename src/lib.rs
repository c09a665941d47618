use std::sync::Arc;

use crate::core::{
    db::init_pool,
    gateway::{
        filesystem::FilesystemStorage, memory::InMemoryGateway, postgres::PgRecordGateway,
        RecordGateway, StorageGateway,
    },
    session::SessionProvider,
};
use poem::{
    middleware::{AddData, AddDataEndpoint, Cors, CorsEndpoint},
    EndpointExt, Route,
};
use poem_openapi::OpenApiService;
use route::{notification::ApiNotification, profile::ApiProfile};
use settings::{Config, GatewayKind};
use store::ProfilePage;
use tracing::info;

pub mod cli;
pub mod core;
pub mod factory;
pub mod model;
pub mod repository;
pub mod route;
pub mod schema;
pub mod settings;
pub mod store;

pub struct AppState {
    pub page: ProfilePage,
}

impl AppState {
    pub fn new(
        session: Arc<SessionProvider>,
        records: Arc<dyn RecordGateway>,
        storage: Arc<dyn StorageGateway>,
        config: &Config,
    ) -> Self {
        Self {
            page: ProfilePage::new(session, records, storage, config.max_avatar_bytes),
        }
    }
}

/// Wire the session and the gateways selected by `config`.
pub async fn init_app_state(config: &Config) -> anyhow::Result<AppState> {
    let session = Arc::new(SessionProvider::from_config(config));
    let (records, storage) = match config.gateway {
        GatewayKind::Postgres => {
            info!("Init Postgres connection");
            let pool = init_pool(config).await?;
            info!("Init filesystem storage on {}", config.storage_root);
            let storage = FilesystemStorage::new(&config.storage_root, &config.storage_public_url);
            let records: Arc<dyn RecordGateway> = Arc::new(PgRecordGateway::new(pool));
            let storage: Arc<dyn StorageGateway> = Arc::new(storage);
            (records, storage)
        }
        GatewayKind::Memory => {
            info!("Init in-memory gateway");
            let gateway = Arc::new(InMemoryGateway::new(&config.storage_public_url));
            let records: Arc<dyn RecordGateway> = gateway.clone();
            let storage: Arc<dyn StorageGateway> = gateway;
            (records, storage)
        }
    };
    Ok(AppState::new(session, records, storage, config))
}

pub fn init_openapi_route(
    app_state: Arc<AppState>,
    config: &Config,
) -> CorsEndpoint<AddDataEndpoint<Route, Arc<AppState>>> {
    let prefix = config.prefix.clone().unwrap_or("/".to_string());
    let openapi_route = OpenApiService::new((ApiProfile, ApiNotification), "Krishi Portal", "1.0")
        .server(prefix.clone());
    let openapi_json_endpoint = openapi_route.spec_endpoint();
    let ui = openapi_route.swagger_ui();
    Route::new()
        .nest(prefix, openapi_route)
        .nest("/docs", ui)
        .at("openapi.json", openapi_json_endpoint)
        .with(AddData::new(app_state))
        .with(Cors::new())
}
