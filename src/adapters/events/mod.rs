//! Payment event sink adapters.
//!
//! - `TracingPaymentEventSink` - Logs verified payment events
//! - `InMemoryPaymentEventSink` - Captures events for testing

mod in_memory;
mod tracing_sink;

pub use in_memory::InMemoryPaymentEventSink;
pub use tracing_sink::TracingPaymentEventSink;
