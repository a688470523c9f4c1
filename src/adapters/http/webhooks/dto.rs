//! HTTP DTOs for the webhook endpoint.
//!
//! The provider only looks at the status code; the body is for humans
//! replaying deliveries by hand.

use serde::Serialize;

use crate::domain::webhook::{DeliveryState, ProcessOutcome};

/// Body returned when a listener decided the delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookAckResponse {
    pub listener: String,
    /// `ignored`, `failed`, `verified` or `dispatched`.
    pub result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
}

impl WebhookAckResponse {
    pub fn new(listener: &str, outcome: &ProcessOutcome) -> Self {
        Self {
            listener: listener.to_string(),
            result: state_label(outcome.state),
            event_type: outcome.event_type.clone(),
            handler: outcome.handler.clone(),
        }
    }
}

/// Error body, same shape as the rest of the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

fn state_label(state: DeliveryState) -> &'static str {
    match state {
        DeliveryState::Received => "received",
        DeliveryState::Ignored => "ignored",
        DeliveryState::Skipped => "skipped",
        DeliveryState::Failed => "failed",
        DeliveryState::Verified => "verified",
        DeliveryState::Dispatched => "dispatched",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_omits_missing_fields() {
        let outcome = ProcessOutcome {
            state: DeliveryState::Ignored,
            event_type: None,
            handler: None,
            handler_error: None,
        };

        let json = serde_json::to_value(WebhookAckResponse::new("paypal", &outcome)).unwrap();

        assert_eq!(json, serde_json::json!({"listener": "paypal", "result": "ignored"}));
    }

    #[test]
    fn ack_reports_handler() {
        let outcome = ProcessOutcome {
            state: DeliveryState::Dispatched,
            event_type: Some("PAYMENT.CAPTURE.COMPLETED".to_string()),
            handler: Some("PaymentCaptureCompleted".to_string()),
            handler_error: None,
        };

        let response = WebhookAckResponse::new("paypal", &outcome);

        assert_eq!(response.result, "dispatched");
        assert_eq!(response.handler.as_deref(), Some("PaymentCaptureCompleted"));
    }
}
