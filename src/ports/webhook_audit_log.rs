//! WebhookAuditLog port - Append-only record of every inbound delivery.
//!
//! One record is written per delivery, whatever the outcome. Redeliveries are
//! recorded again; the log never deduplicates and nothing reads it back in the
//! request path. It exists for operators.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::Timestamp;
use crate::domain::webhook::{EventEnvelope, VerificationStatus};

pub const WEBHOOK_ID_MAX_CHARS: usize = 64;
pub const EVENT_TYPE_MAX_CHARS: usize = 64;
pub const USER_AGENT_MAX_CHARS: usize = 192;
pub const REQUEST_METHOD_MAX_CHARS: usize = 32;

/// One audit row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    /// Provider event id from the body, empty if absent.
    pub webhook_id: String,
    pub event_type: String,
    pub user_agent: String,
    pub request_method: String,
    /// Request headers serialized as a JSON object.
    pub request_headers: String,
    /// Body bytes exactly as received.
    pub body: Vec<u8>,
    pub verification_status: VerificationStatus,
    pub created_at: Timestamp,
}

impl AuditRecord {
    /// Builds a record, cleaning bounded columns instead of rejecting them.
    pub fn from_envelope(envelope: &EventEnvelope, status: VerificationStatus) -> Self {
        Self {
            webhook_id: sanitize_column(
                envelope.event_id().unwrap_or_default(),
                WEBHOOK_ID_MAX_CHARS,
            ),
            event_type: sanitize_column(
                envelope.event_type().unwrap_or_default(),
                EVENT_TYPE_MAX_CHARS,
            ),
            user_agent: sanitize_column(envelope.user_agent(), USER_AGENT_MAX_CHARS),
            request_method: sanitize_column(envelope.method(), REQUEST_METHOD_MAX_CHARS),
            request_headers: envelope.headers().to_json(),
            body: envelope.raw_body().to_vec(),
            verification_status: status,
            created_at: Timestamp::now(),
        }
    }
}

/// Drops NUL characters, which text columns cannot store, then truncates.
fn sanitize_column(value: &str, max: usize) -> String {
    if value.contains('\0') {
        truncate_chars(&value.replace('\0', ""), max)
    } else {
        truncate_chars(value, max)
    }
}

/// Keeps at most `max` characters, never splitting a UTF-8 sequence.
fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((end, _)) => value[..end].to_string(),
        None => value.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditLogError {
    #[error("Audit log storage error: {0}")]
    Storage(String),
}

/// Port for the webhook audit log.
#[async_trait]
pub trait WebhookAuditLog: Send + Sync {
    /// Appends one record.
    async fn append(&self, record: AuditRecord) -> Result<(), AuditLogError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::webhook::RequestHeaders;

    #[test]
    fn truncates_on_character_boundaries() {
        assert_eq!(truncate_chars("abcdef", 4), "abcd");
        assert_eq!(truncate_chars("abc", 4), "abc");
        assert_eq!(truncate_chars("ééééé", 3), "ééé");
        assert_eq!(truncate_chars("🦀🦀", 1), "🦀");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn record_copies_envelope_fields() {
        let headers: RequestHeaders = [("User-Agent", "PayPal/1.0"), ("X-Trace", "abc")]
            .into_iter()
            .collect();
        let body = r#"{"id":"WH-9","event_type":"PAYMENT.CAPTURE.DENIED"}"#;
        let envelope = EventEnvelope::from_request("POST", headers, body);

        let record = AuditRecord::from_envelope(&envelope, VerificationStatus::Failed);

        assert_eq!(record.webhook_id, "WH-9");
        assert_eq!(record.event_type, "PAYMENT.CAPTURE.DENIED");
        assert_eq!(record.user_agent, "PayPal/1.0");
        assert_eq!(record.request_method, "POST");
        assert!(record.request_headers.contains("\"x-trace\":\"abc\""));
        assert_eq!(record.body, body.as_bytes());
        assert_eq!(record.verification_status, VerificationStatus::Failed);
    }

    #[test]
    fn oversized_fields_are_truncated_not_rejected() {
        let long_type = "E".repeat(200);
        let body = format!(r#"{{"id":"{}","event_type":"{}"}}"#, "W".repeat(100), long_type);
        let envelope = EventEnvelope::new(
            "POST",
            RequestHeaders::new(),
            body.clone(),
            "ü".repeat(300),
        );

        let record = AuditRecord::from_envelope(&envelope, VerificationStatus::Ignored);

        assert_eq!(record.webhook_id.chars().count(), WEBHOOK_ID_MAX_CHARS);
        assert_eq!(record.event_type.chars().count(), EVENT_TYPE_MAX_CHARS);
        assert_eq!(record.user_agent.chars().count(), USER_AGENT_MAX_CHARS);
        assert_eq!(record.body, body.as_bytes());
    }

    #[test]
    fn nul_characters_are_stripped_from_columns() {
        let body = r#"{"id":"WH\u0000X","event_type":"A\u0000B"}"#;
        let envelope = EventEnvelope::new("PO\0ST", RequestHeaders::new(), body, "Pay\0Pal/1.0");

        assert_eq!(envelope.event_id(), Some("WH\0X"));

        let record = AuditRecord::from_envelope(&envelope, VerificationStatus::Failed);

        assert_eq!(record.webhook_id, "WHX");
        assert_eq!(record.event_type, "AB");
        assert_eq!(record.user_agent, "PayPal/1.0");
        assert_eq!(record.request_method, "POST");
        assert_eq!(record.body, body.as_bytes());
    }

    #[test]
    fn sanitize_truncates_after_stripping() {
        assert_eq!(sanitize_column("\0\0abcdef", 4), "abcd");
        assert_eq!(sanitize_column("\0", 4), "");
    }

    #[test]
    fn missing_body_fields_become_empty_strings() {
        let envelope = EventEnvelope::new("GET", RequestHeaders::new(), Vec::new(), "");
        let record = AuditRecord::from_envelope(&envelope, VerificationStatus::Ignored);

        assert_eq!(record.webhook_id, "");
        assert_eq!(record.event_type, "");
        assert_eq!(record.request_headers, "{}");
    }
}
