use std::{env, fmt::Display, str::FromStr};

use tracing::info;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub rate_limit_per_sec: u64,
    pub recommendation_limit: usize,
}

impl AppConfig {
    /// Loads `.env` (if present) and then reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            database_path: try_load("DATABASE_PATH", "marketplace.db")?,
            host: try_load("HOST", "0.0.0.0")?,
            port: try_load("PORT", "8080")?,
            rate_limit_per_sec: try_load("RATE_LIMIT_PER_SEC", "20")?,
            recommendation_limit: try_load("RECOMMENDATION_LIMIT", "10")?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "marketplace.db".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            rate_limit_per_sec: 20,
            recommendation_limit: 10,
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| AppError::ConfigError(format!("Invalid {key} value '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_falls_back_to_default() {
        let port: u16 = try_load("MARKETPLACE_TEST_UNSET_PORT", "9090").unwrap();
        assert_eq!(port, 9090);
    }

    #[test]
    fn unparsable_variable_is_a_config_error() {
        env::set_var("MARKETPLACE_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16> = try_load("MARKETPLACE_TEST_BAD_PORT", "8080");
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        let config = AppConfig { host: "127.0.0.1".into(), port: 3000, ..AppConfig::default() };
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }
}
