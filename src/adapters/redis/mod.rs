//! Redis adapters.
//!
//! - `RedisTokenStore` - Session-scoped encrypted token storage

mod token_store;

pub use token_store::{RedisTokenStore, DEFAULT_KEY_PREFIX};
