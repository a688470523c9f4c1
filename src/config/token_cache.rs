//! Token cache configuration

use serde::Deserialize;

use super::error::ValidationError;

pub const MIN_SECRET_LEN: usize = 16;

/// Encrypted access-token cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenCacheConfig {
    /// Secret the AES key is derived from
    pub secret: String,

    /// Redis key prefix for cached entries
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl TokenCacheConfig {
    /// Validate token cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.secret.is_empty() {
            return Err(ValidationError::MissingRequired("TOKEN_CACHE__SECRET"));
        }
        if self.secret.chars().count() < MIN_SECRET_LEN {
            return Err(ValidationError::TokenSecretTooShort(MIN_SECRET_LEN));
        }
        Ok(())
    }
}

impl Default for TokenCacheConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_key_prefix() -> String {
    crate::adapters::redis::DEFAULT_KEY_PREFIX.to_string()
}
