//! Webhook HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, WebhookAckResponse};
pub use handlers::{receive_webhook, WebhookAppState};
pub use routes::webhook_router;
