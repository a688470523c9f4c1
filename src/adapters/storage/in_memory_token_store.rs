//! In-Memory Token Store Adapter
//!
//! Session-keyed ciphertext storage in memory. Useful for testing,
//! development, and single-process deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::token::CachedToken;
use crate::ports::{TokenStore, TokenStoreError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStore {
    entries: Arc<RwLock<HashMap<String, CachedToken>>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self, session_key: &str) -> Result<Option<CachedToken>, TokenStoreError> {
        Ok(self.entries.read().await.get(session_key).cloned())
    }

    async fn store(&self, session_key: &str, token: &CachedToken) -> Result<(), TokenStoreError> {
        self.entries
            .write()
            .await
            .insert(session_key.to_string(), token.clone());
        Ok(())
    }

    async fn remove(&self, session_key: &str) -> Result<(), TokenStoreError> {
        self.entries.write().await.remove(session_key);
        Ok(())
    }
}
