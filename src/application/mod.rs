//! Application layer - Coordinates domain services and ports.
//!
//! Holds the listener chain that fronts the webhook endpoint and the
//! handlers that turn verified provider events into storefront events.

pub mod handlers;

pub use handlers::{default_registry, ChainDecision, WebhookListenerChain};
