//! Storage Adapters
//!
//! In-memory implementations of the audit log and token store ports.
//!
//! ## Available Adapters
//!
//! - **InMemoryAuditLog** - Append-only webhook audit records (testing/development)
//! - **InMemoryTokenStore** - Session-keyed encrypted tokens (testing/single process)
//!
//! Production deployments use `postgres::PostgresWebhookAuditLog` and
//! `redis::RedisTokenStore`.

mod in_memory_audit_log;
mod in_memory_token_store;

pub use in_memory_audit_log::InMemoryAuditLog;
pub use in_memory_token_store::InMemoryTokenStore;
