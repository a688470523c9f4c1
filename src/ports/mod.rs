//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Webhook Ports
//!
//! - `WebhookAuditLog` - Append-only record of every delivery
//! - `WebhookIdSource` - Configured webhook id used in signatures
//! - `CertificateFetcher` - Provider signing certificates
//! - `RemoteSignatureVerifier` - Provider-side verification fallback
//! - `PaymentEventSink` - Destination for verified payment events
//!
//! ## Token Cache Ports
//!
//! - `TokenStore` - Session-scoped ciphertext storage
//! - `Clock` - Time source for expiry

mod certificate_fetcher;
mod clock;
mod payment_event_sink;
mod remote_signature_verifier;
mod token_store;
mod webhook_audit_log;
mod webhook_id_source;

pub use certificate_fetcher::CertificateFetcher;
pub use clock::Clock;
pub use payment_event_sink::{PaymentEvent, PaymentEventSink};
pub use remote_signature_verifier::RemoteSignatureVerifier;
pub use token_store::{TokenStore, TokenStoreError};
pub use webhook_audit_log::{
    AuditLogError, AuditRecord, WebhookAuditLog, EVENT_TYPE_MAX_CHARS,
    REQUEST_METHOD_MAX_CHARS, USER_AGENT_MAX_CHARS, WEBHOOK_ID_MAX_CHARS,
};
pub use webhook_id_source::WebhookIdSource;
