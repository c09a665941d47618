use tokio::process::Command;

use crate::settings::Config;

async fn sqlx_migrate(args: &[&str]) -> anyhow::Result<()> {
    let status = Command::new("sqlx")
        .arg("migrate")
        .args(args)
        .status()
        .await?;
    if !status.success() {
        anyhow::bail!("sqlx migrate {} exited with {}", args.join(" "), status);
    }
    Ok(())
}

pub async fn db_generate(migration_name: &str) -> anyhow::Result<()> {
    sqlx_migrate(&["add", migration_name, "-r"]).await
}

pub async fn db_list(config: &Config) -> anyhow::Result<()> {
    sqlx_migrate(&["info", "-D", config.database_url()?]).await
}

pub async fn db_migrate(config: &Config) -> anyhow::Result<()> {
    sqlx_migrate(&["run", "-D", config.database_url()?]).await
}

pub async fn db_revert(config: &Config) -> anyhow::Result<()> {
    sqlx_migrate(&["revert", "-D", config.database_url()?]).await
}
