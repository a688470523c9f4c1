//! Handlers for the provider payment events this storefront subscribes to.
//!
//! Each handler forwards `(event_type, resource_id, resource)` to the
//! `PaymentEventSink`. Handler names are the normalized event types, so
//! `PAYMENT.CAPTURE.COMPLETED` resolves to `PaymentCaptureCompleted`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::webhook::{EventEnvelope, HandlerRegistry, WebhookError, WebhookEventHandler};
use crate::ports::{PaymentEvent, PaymentEventSink};

/// Defines a handler struct that forwards one event type to the sink.
macro_rules! payment_event_handler {
    ($(#[$meta:meta])* $name:ident => $event_type:literal) => {
        $(#[$meta])*
        pub struct $name {
            sink: Arc<dyn PaymentEventSink>,
        }

        impl $name {
            pub const NAME: &'static str = stringify!($name);
            pub const EVENT_TYPE: &'static str = $event_type;

            pub fn new(sink: Arc<dyn PaymentEventSink>) -> Self {
                Self { sink }
            }
        }

        #[async_trait]
        impl WebhookEventHandler for $name {
            fn name(&self) -> &str {
                Self::NAME
            }

            fn supported_event_types(&self) -> &[&'static str] {
                &[$event_type]
            }

            async fn handle(&self, envelope: &EventEnvelope) -> Result<(), WebhookError> {
                forward(self.sink.as_ref(), envelope).await
            }
        }
    };
}

payment_event_handler!(
    /// A capture settled; the order can be fulfilled.
    PaymentCaptureCompleted => "PAYMENT.CAPTURE.COMPLETED"
);
payment_event_handler!(
    /// The capture was declined.
    PaymentCaptureDenied => "PAYMENT.CAPTURE.DENIED"
);
payment_event_handler!(PaymentCaptureRefunded => "PAYMENT.CAPTURE.REFUNDED");
payment_event_handler!(
    /// Capture is held (e.g. eCheck, review); wait for completed or denied.
    PaymentCapturePending => "PAYMENT.CAPTURE.PENDING"
);
payment_event_handler!(CheckoutOrderApproved => "CHECKOUT.ORDER.APPROVED");
payment_event_handler!(BillingSubscriptionActivated => "BILLING.SUBSCRIPTION.ACTIVATED");
payment_event_handler!(BillingSubscriptionCancelled => "BILLING.SUBSCRIPTION.CANCELLED");
payment_event_handler!(BillingSubscriptionSuspended => "BILLING.SUBSCRIPTION.SUSPENDED");

async fn forward(sink: &dyn PaymentEventSink, envelope: &EventEnvelope) -> Result<(), WebhookError> {
    let event_type = envelope
        .event_type()
        .ok_or_else(|| WebhookError::HandlerFailed("event has no event_type".to_string()))?;
    let resource = envelope.resource().cloned().unwrap_or(Value::Null);
    let resource_id = resource
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string);

    sink.publish(PaymentEvent {
        event_id: envelope.event_id().map(str::to_string),
        event_type: event_type.to_string(),
        resource_id,
        resource,
    })
    .await
    .map_err(|e| WebhookError::HandlerFailed(e.to_string()))
}

/// Registry with every shipped payment handler, all publishing to `sink`.
pub fn default_registry(sink: Arc<dyn PaymentEventSink>) -> HandlerRegistry {
    HandlerRegistry::new()
        .with_handler(Arc::new(PaymentCaptureCompleted::new(sink.clone())))
        .with_handler(Arc::new(PaymentCaptureDenied::new(sink.clone())))
        .with_handler(Arc::new(PaymentCaptureRefunded::new(sink.clone())))
        .with_handler(Arc::new(PaymentCapturePending::new(sink.clone())))
        .with_handler(Arc::new(CheckoutOrderApproved::new(sink.clone())))
        .with_handler(Arc::new(BillingSubscriptionActivated::new(sink.clone())))
        .with_handler(Arc::new(BillingSubscriptionCancelled::new(sink.clone())))
        .with_handler(Arc::new(BillingSubscriptionSuspended::new(sink)))
}
