//! Webhook application services.
//!
//! - `WebhookListenerChain` - Tries listeners in order, maps the result to a reply
//! - Payment event handlers - One per subscribed provider event type

mod listener_chain;
mod payment_events;

pub use listener_chain::{ChainDecision, WebhookListenerChain};
pub use payment_events::{
    default_registry, BillingSubscriptionActivated, BillingSubscriptionCancelled,
    BillingSubscriptionSuspended, CheckoutOrderApproved, PaymentCaptureCompleted,
    PaymentCaptureDenied, PaymentCapturePending, PaymentCaptureRefunded,
};
