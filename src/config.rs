use std::env;
use std::str::FromStr;

use anyhow::Context;
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,

    pub api_prefix: String,
    pub environment: String,

    // Rate limiting
    pub rate_api_per_min: u32,

    // Logging
    pub log_dir: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:8000".to_string(),
            database_url: "memory://".to_string(),
            db_max_connections: 10,
            api_prefix: "/api/v1".to_string(),
            environment: "dev".to_string(),
            rate_api_per_min: 1000,
            log_dir: "logs".to_string(),
            log_level: "debug".to_string(),
        }
    }
}

fn string_var(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn parsed_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        let defaults = Config::default();

        Ok(Self {
            server_addr: string_var("SERVER_ADDR", defaults.server_addr),
            database_url: string_var("DATABASE_URL", defaults.database_url),
            db_max_connections: parsed_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            api_prefix: string_var("API_PREFIX", defaults.api_prefix),
            environment: string_var("ENVIRONMENT", defaults.environment),
            rate_api_per_min: parsed_var("RATE_API_PER_MIN", defaults.rate_api_per_min)?,
            log_dir: string_var("LOG_DIR", defaults.log_dir),
            log_level: string_var("LOG_LEVEL", defaults.log_level),
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.is_empty() || self.database_url.starts_with("memory://")
    }
}
