//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `paypal` - Provider REST API, certificates, signature postback
//! - `postgres` - Webhook audit log
//! - `redis` - Encrypted token store
//! - `http` - Axum webhook endpoint
//! - `events` - Payment event sinks
//! - `storage` - In-memory audit log and token store
//! - `clock` - System and manual clocks

pub mod clock;
pub mod events;
pub mod http;
pub mod paypal;
pub mod postgres;
pub mod redis;
pub mod storage;

pub use clock::{ManualClock, SystemClock};
pub use events::{InMemoryPaymentEventSink, TracingPaymentEventSink};
pub use storage::{InMemoryAuditLog, InMemoryTokenStore};
