//! Payment event sink that only logs.
//!
//! Default for deployments that have not wired order or subscription
//! processing yet; every verified event still shows up in the logs.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::{PaymentEvent, PaymentEventSink};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPaymentEventSink;

#[async_trait]
impl PaymentEventSink for TracingPaymentEventSink {
    async fn publish(&self, event: PaymentEvent) -> Result<(), DomainError> {
        tracing::info!(
            event_type = %event.event_type,
            event_id = ?event.event_id,
            resource_id = ?event.resource_id,
            "Payment event received"
        );
        Ok(())
    }
}
