//! TokenStore port - Session-scoped storage for encrypted tokens.
//!
//! The store only ever sees ciphertext. Expiry is enforced by the cache;
//! stores with native TTL support may also expire entries on their own.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::token::CachedToken;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenStoreError {
    #[error("Token store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored token entry is malformed: {0}")]
    Malformed(String),
}

/// Port for persisting one cached token per session key.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self, session_key: &str) -> Result<Option<CachedToken>, TokenStoreError>;

    /// Stores `token`, replacing any previous entry for the session.
    async fn store(&self, session_key: &str, token: &CachedToken) -> Result<(), TokenStoreError>;

    /// Removes the entry. Removing a missing entry is not an error.
    async fn remove(&self, session_key: &str) -> Result<(), TokenStoreError>;
}
