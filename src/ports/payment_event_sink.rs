//! PaymentEventSink port - Where verified payment events are delivered.
//!
//! Webhook handlers extract the interesting parts of an event and hand them
//! here. What happens next (updating an order, provisioning a subscription)
//! belongs to the storefront, not this crate.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::domain::foundation::DomainError;

/// A verified provider event, reduced to what downstream code needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentEvent {
    /// Provider event id (`WH-...`).
    pub event_id: Option<String>,
    pub event_type: String,
    /// Id of the capture, order, or subscription the event describes.
    pub resource_id: Option<String>,
    pub resource: Value,
}

/// Port for consuming verified payment events.
#[async_trait]
pub trait PaymentEventSink: Send + Sync {
    async fn publish(&self, event: PaymentEvent) -> Result<(), DomainError>;
}
