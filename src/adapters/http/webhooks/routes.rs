//! Axum router configuration for webhook endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{receive_webhook, WebhookAppState};

/// Create the webhook router.
///
/// Webhooks carry no user authentication; each delivery is verified by
/// signature before anything acts on it.
///
/// # Routes
/// - `POST /webhooks/paypal` - Provider webhook deliveries
pub fn webhook_router() -> Router<WebhookAppState> {
    Router::new().route("/webhooks/paypal", post(receive_webhook))
}
