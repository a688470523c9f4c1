//! HTTP handler for inbound provider webhooks.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::application::{ChainDecision, WebhookListenerChain};
use crate::domain::webhook::{EventEnvelope, RequestHeaders};

use super::dto::{ErrorResponse, WebhookAckResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct WebhookAppState {
    pub chain: Arc<WebhookListenerChain>,
}

impl WebhookAppState {
    pub fn new(chain: Arc<WebhookListenerChain>) -> Self {
        Self { chain }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/paypal - Receive a provider webhook delivery
///
/// The body is taken as raw bytes; the signature covers them exactly.
pub async fn receive_webhook(
    State(state): State<WebhookAppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let envelope = EventEnvelope::from_request(method.as_str(), request_headers(&headers), body.to_vec());
    let decision = state.chain.dispatch(&envelope).await;
    decision_response(&decision)
}

/// Copies header values that are valid UTF-8. Names are lowercased by `http`.
fn request_headers(headers: &HeaderMap) -> RequestHeaders {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .collect()
}

fn decision_response(decision: &ChainDecision) -> Response {
    let status =
        StatusCode::from_u16(decision.status_code()).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);

    match decision {
        ChainDecision::Decided { listener, outcome } => {
            (status, Json(WebhookAckResponse::new(listener, outcome))).into_response()
        }
        ChainDecision::Indeterminate => (
            status,
            Json(ErrorResponse::new(
                "VERIFICATION_UNAVAILABLE",
                "Webhook could not be verified right now; redeliver later",
            )),
        )
            .into_response(),
    }
}
