//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `STOREFRONT_PAYMENTS`
//! prefix and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use storefront_payments::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod paypal;
mod redis;
mod server;
mod token_cache;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use paypal::PayPalConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use token_cache::{TokenCacheConfig, MIN_SECRET_LEN};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Audit log database
    pub database: DatabaseConfig,

    /// Token store
    pub redis: RedisConfig,

    /// Provider credentials, webhook id, verification tuning
    #[serde(default)]
    pub paypal: PayPalConfig,

    pub token_cache: TokenCacheConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `STOREFRONT_PAYMENTS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `STOREFRONT_PAYMENTS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `STOREFRONT_PAYMENTS__PAYPAL__WEBHOOK_ID=...` -> `paypal.webhook_id = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("STOREFRONT_PAYMENTS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.paypal.validate()?;
        self.token_cache.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
