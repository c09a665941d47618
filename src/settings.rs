use std::env;

use serde::Deserialize;

#[derive(Clone, Copy, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    #[default]
    Postgres,
    Memory,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_env")]
    pub env: String, // file / server
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub prefix: Option<String>,
    #[serde(default)]
    pub gateway: GatewayKind,
    pub database_url: Option<String>,
    #[serde(default = "default_storage_root")]
    pub storage_root: String,
    #[serde(default = "default_storage_public_url")]
    pub storage_public_url: String,
    #[serde(default = "default_demo_user_id")]
    pub demo_user_id: String,
    #[serde(default = "default_demo_user_email")]
    pub demo_user_email: String,
    #[serde(default = "default_max_avatar_bytes")]
    pub max_avatar_bytes: usize,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_env() -> String {
    "file".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_storage_root() -> String {
    "./storage".to_string()
}

fn default_storage_public_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_demo_user_id() -> String {
    "mock-user-id".to_string()
}

fn default_demo_user_email() -> String {
    "demo@example.com".to_string()
}

fn default_max_avatar_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: default_env(),
            host: default_host(),
            port: default_port(),
            prefix: None,
            gateway: GatewayKind::default(),
            database_url: None,
            storage_root: default_storage_root(),
            storage_public_url: default_storage_public_url(),
            demo_user_id: default_demo_user_id(),
            demo_user_email: default_demo_user_email(),
            max_avatar_bytes: default_max_avatar_bytes(),
            log_dir: default_log_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn env_source(&self) -> &'static str {
        if self.env == "file" {
            "using .env file as environment variables"
        } else {
            "using server environment as environment variables"
        }
    }

    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required when GATEWAY=postgres"))
    }
}

/// Read the config from the environment, loading `.env` first unless
/// `ENV=server`. Nothing is logged here since the subscriber is set up from
/// the returned config.
pub fn get_config() -> anyhow::Result<Config> {
    let env_var = env::var("ENV").unwrap_or(default_env());
    if env_var == "file" {
        let _ = dotenvy::dotenv();
    }
    Ok(envy::from_env::<Config>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_demo_identity() {
        let config = Config::default();
        assert_eq!(config.demo_user_id, "mock-user-id");
        assert_eq!(config.demo_user_email, "demo@example.com");
        assert_eq!(config.gateway, GatewayKind::Postgres);
        assert_eq!(config.max_avatar_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_database_url_required() {
        let mut config = Config::default();
        assert!(config.database_url().is_err());
        config.database_url = Some("postgres://localhost/krishi".to_string());
        assert_eq!(config.database_url().unwrap(), "postgres://localhost/krishi");
    }

    #[test]
    fn test_env_source() {
        let mut config = Config::default();
        assert_eq!(
            config.env_source(),
            "using .env file as environment variables"
        );
        config.env = "server".to_string();
        assert_eq!(
            config.env_source(),
            "using server environment as environment variables"
        );
    }

    #[test]
    fn test_gateway_kind_deserialize() {
        let kind: GatewayKind = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(kind, GatewayKind::Memory);
    }
}
