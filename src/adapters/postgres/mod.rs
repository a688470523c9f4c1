//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresWebhookAuditLog` - Append-only webhook audit log

mod webhook_audit_log;

pub use webhook_audit_log::PostgresWebhookAuditLog;
