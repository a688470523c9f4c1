//! Application handlers.

pub mod webhooks;

pub use webhooks::{default_registry, ChainDecision, WebhookListenerChain};
