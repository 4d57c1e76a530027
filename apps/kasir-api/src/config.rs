//! API server configuration.
//!
//! Layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. `kasir.toml` in the working directory (optional)
//! 3. `KASIR__<KEY>` environment variables (e.g. `KASIR__MAX_CONNECTIONS=10`)
//! 4. The conventional `PORT` and `DATABASE_PATH` variables
//!
//! A `.env` file is loaded first when present.

use std::env;
use std::net::SocketAddr;

use config::{Config, Environment, File};
use kasir_db::{CheckoutSettings, DbConfig};
use serde::Deserialize;

/// API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub max_connections: u32,

    /// Accept payments below the total (negative change due)
    pub allow_underpayment: bool,

    /// Checkout attempts when an invoice code is contended
    pub invoice_retry_attempts: u32,

    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl ApiConfig {
    /// Load configuration from defaults, `kasir.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("database_path", "kasir.db")?
            .set_default("max_connections", 5)?
            .set_default("allow_underpayment", true)?
            .set_default("invoice_retry_attempts", 3)?
            .set_default("log_filter", "info,kasir=debug,sqlx=warn")?
            .add_source(File::with_name("kasir").required(false))
            .add_source(
                Environment::with_prefix("KASIR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(port) = env::var("PORT") {
            builder = builder.set_override("port", port)?;
        }
        if let Ok(path) = env::var("DATABASE_PATH") {
            builder = builder.set_override("database_path", path)?;
        }

        let config: ApiConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.invoice_retry_attempts == 0 {
            return Err(ConfigError::InvalidValue("invoice_retry_attempts".to_string()));
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("host".to_string()))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            allow_underpayment: self.allow_underpayment,
            max_attempts: self.invoice_retry_attempts,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ApiConfig {
        ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_path: "kasir.db".to_string(),
            max_connections: 5,
            allow_underpayment: false,
            invoice_retry_attempts: 4,
            log_filter: "info".to_string(),
        }
    }

    #[test]
    fn test_bind_addr() {
        let addr = sample().bind_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:5000");

        let bad = ApiConfig {
            host: "not a host".to_string(),
            ..sample()
        };
        assert!(matches!(bad.bind_addr(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_checkout_settings() {
        let settings = sample().checkout_settings();
        assert!(!settings.allow_underpayment);
        assert_eq!(settings.max_attempts, 4);
    }

    #[test]
    fn test_validate_rejects_zero_pool() {
        let bad = ApiConfig {
            max_connections: 0,
            ..sample()
        };
        assert!(bad.validate().is_err());
        assert!(sample().validate().is_ok());
    }
}
