//! Encrypted, session-scoped cache for short-lived provider access tokens.

mod cache;
mod cipher;
mod errors;

pub use cache::{CachedToken, TokenCache, TokenCacheFactory};
pub use cipher::{TokenCipher, IV_LEN};
pub use errors::TokenCacheError;
