//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("PayPal API base URL must be an https URL")]
    InvalidApiBaseUrl,

    #[error("Certificate host allow-list is empty")]
    NoCertificateHosts,

    #[error("Invalid certificate host: {0}")]
    InvalidCertificateHost(String),

    #[error("Network timeout must be between 1 and 30 seconds")]
    InvalidNetworkTimeout,

    #[error("Postback attempts must be between 1 and 5")]
    InvalidPostbackAttempts,

    #[error("Token cache secret must be at least {0} characters")]
    TokenSecretTooShort(usize),
}
