//! Session-scoped encrypted access-token cache.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::ports::{Clock, TokenStore};

use super::cipher::TokenCipher;
use super::errors::TokenCacheError;

/// What the store holds for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    /// `base64(iv || ciphertext)`.
    pub ciphertext: String,
    pub expires_at: Timestamp,
}

impl CachedToken {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }

    /// Whole seconds left before expiry, zero once expired.
    pub fn remaining_secs(&self, now: Timestamp) -> u64 {
        u64::try_from(self.expires_at.as_unix_secs() - now.as_unix_secs()).unwrap_or(0)
    }
}

/// Access-token cache bound to one session.
///
/// Any failure reading or decrypting the stored value clears it and reports a
/// miss, so callers simply fetch a new token.
#[derive(Clone)]
pub struct TokenCache {
    session_key: String,
    cipher: Arc<TokenCipher>,
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
}

impl TokenCache {
    pub fn new(
        session_key: impl Into<String>,
        cipher: Arc<TokenCipher>,
        store: Arc<dyn TokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session_key: session_key.into(),
            cipher,
            store,
            clock,
        }
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    /// Encrypts and stores `token` for `ttl_secs` seconds, replacing any previous entry.
    pub async fn save(&self, token: &str, ttl_secs: u64) -> Result<(), TokenCacheError> {
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        let entry = CachedToken {
            ciphertext: self.cipher.encrypt(token)?,
            expires_at: self.clock.now().plus_secs(ttl),
        };

        self.store.store(&self.session_key, &entry).await?;
        tracing::debug!(session = %self.session_key, ttl_secs, "Cached access token");
        Ok(())
    }

    /// The cached token, or `None` if absent, expired, or unreadable.
    pub async fn get(&self) -> Option<String> {
        let entry = match self.store.load(&self.session_key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(session = %self.session_key, error = %err, "Token store read failed");
                return None;
            }
        };

        if entry.is_expired(self.clock.now()) {
            tracing::debug!(session = %self.session_key, "Cached access token expired");
            self.clear().await;
            return None;
        }

        match self.cipher.decrypt(&entry.ciphertext) {
            Ok(token) => Some(token),
            Err(err) => {
                tracing::warn!(
                    session = %self.session_key,
                    error = %err,
                    "Discarding unreadable cached token"
                );
                self.clear().await;
                None
            }
        }
    }

    /// Removes the entry. Store failures are logged.
    pub async fn clear(&self) {
        if let Err(err) = self.store.remove(&self.session_key).await {
            tracing::warn!(session = %self.session_key, error = %err, "Token store delete failed");
        }
    }
}

/// Hands out caches for individual sessions sharing one cipher and store.
#[derive(Clone)]
pub struct TokenCacheFactory {
    cipher: Arc<TokenCipher>,
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
}

impl TokenCacheFactory {
    pub fn new(cipher: TokenCipher, store: Arc<dyn TokenStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cipher: Arc::new(cipher),
            store,
            clock,
        }
    }

    pub fn for_session(&self, session_key: impl Into<String>) -> TokenCache {
        TokenCache::new(
            session_key,
            Arc::clone(&self.cipher),
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
        )
    }
}
