//! Token cache errors. Callers see every one of these as a cache miss.

use thiserror::Error;

use crate::ports::TokenStoreError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenCacheError {
    #[error("Cipher rejected key or IV length")]
    InvalidKey,

    #[error("Stored token is not valid base64")]
    Encoding,

    #[error("Stored token is shorter than its IV")]
    Truncated,

    #[error("Token decryption failed")]
    Decryption,

    #[error("Decrypted token is not valid UTF-8")]
    NotUtf8,

    #[error(transparent)]
    Store(#[from] TokenStoreError),
}

impl TokenCacheError {
    /// Crypto and decoding failures mean the stored value is unusable and should be dropped.
    pub fn is_corrupt_entry(&self) -> bool {
        matches!(
            self,
            TokenCacheError::Encoding
                | TokenCacheError::Truncated
                | TokenCacheError::Decryption
                | TokenCacheError::NotUtf8
        )
    }
}
