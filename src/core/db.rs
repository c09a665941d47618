use std::time::Duration;

use sqlx::{pool::PoolOptions, Pool, Postgres};

use crate::settings::Config;

pub async fn init_pool(config: &Config) -> anyhow::Result<Pool<Postgres>> {
    let pool = PoolOptions::new()
        .min_connections(1)
        .max_connections(20)
        .idle_timeout(Duration::from_secs(5))
        .connect(config.database_url()?)
        .await?;
    Ok(pool)
}
