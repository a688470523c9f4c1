//! Webhook error types.
//!
//! None of these escape the pipeline: each one resolves to a tri-state
//! verification result or a log line. They exist so the verifier and
//! dispatcher can use `?` internally and so logs carry a precise reason.

use thiserror::Error;

/// Errors raised while authenticating or routing a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Request does not look like a provider webhook.
    #[error("Not a provider webhook: {0}")]
    MalformedOrForeignRequest(String),

    /// No verdict could be reached (missing input, network, certificate).
    #[error("Verification indeterminate: {0}")]
    VerificationIndeterminate(String),

    /// A verdict was reached and the signature does not match.
    #[error("Signature verification failed")]
    VerificationFailed,

    /// No handler is registered under the normalized event name.
    #[error("No handler registered for event type: {0}")]
    HandlerNotFound(String),

    /// A handler exists but does not declare the event type.
    #[error("Handler {handler} does not support event type: {event_type}")]
    HandlerUnsupported { handler: String, event_type: String },

    /// The handler's side effect failed.
    #[error("Handler failed: {0}")]
    HandlerFailed(String),
}

impl WebhookError {
    pub fn indeterminate(reason: impl Into<String>) -> Self {
        WebhookError::VerificationIndeterminate(reason.into())
    }

    /// Only a cryptographic mismatch is a potential security incident.
    pub fn is_security_event(&self) -> bool {
        matches!(self, WebhookError::VerificationFailed)
    }
}

/// Errors while resolving a provider signing certificate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateError {
    #[error("Invalid certificate URL: {0}")]
    InvalidUrl(String),

    #[error("Certificate URL must use https: {0}")]
    InsecureScheme(String),

    #[error("Certificate host not allowed: {0}")]
    HostNotAllowed(String),

    #[error("Certificate fetch failed: {0}")]
    Fetch(String),

    #[error("Certificate fetch timed out")]
    Timeout,

    #[error("Certificate endpoint returned status {0}")]
    Status(u16),

    #[error("Malformed certificate: {0}")]
    Malformed(String),
}

impl From<CertificateError> for WebhookError {
    fn from(err: CertificateError) -> Self {
        WebhookError::VerificationIndeterminate(err.to_string())
    }
}

/// Errors from the provider's server-side verification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostbackError {
    #[error("Could not obtain API credentials: {0}")]
    Credentials(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Verification request timed out")]
    Timeout,

    #[error("Verification endpoint returned status {0}")]
    Status(u16),

    #[error("Unexpected verification response: {0}")]
    UnexpectedResponse(String),
}

impl PostbackError {
    /// Transport problems and server errors may clear up on another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            PostbackError::Credentials(_) | PostbackError::Network(_) | PostbackError::Timeout => {
                true
            }
            PostbackError::Status(status) => *status >= 500 || *status == 401,
            PostbackError::UnexpectedResponse(_) => false,
        }
    }
}

impl From<PostbackError> for WebhookError {
    fn from(err: PostbackError) -> Self {
        WebhookError::VerificationIndeterminate(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_failed_verification_is_a_security_event() {
        assert!(WebhookError::VerificationFailed.is_security_event());
        assert!(!WebhookError::indeterminate("cert fetch").is_security_event());
        assert!(!WebhookError::MalformedOrForeignRequest("x".into()).is_security_event());
    }

    #[test]
    fn certificate_errors_become_indeterminate() {
        let err: WebhookError = CertificateError::Timeout.into();
        assert!(matches!(err, WebhookError::VerificationIndeterminate(_)));
    }

    #[test]
    fn postback_retry_policy() {
        assert!(PostbackError::Timeout.is_retryable());
        assert!(PostbackError::Network("reset".into()).is_retryable());
        assert!(PostbackError::Status(503).is_retryable());
        assert!(PostbackError::Status(401).is_retryable());
        assert!(!PostbackError::Status(400).is_retryable());
        assert!(!PostbackError::UnexpectedResponse("PENDING".into()).is_retryable());
    }

    #[test]
    fn error_messages_display() {
        assert_eq!(
            WebhookError::VerificationFailed.to_string(),
            "Signature verification failed"
        );
        assert_eq!(
            CertificateError::HostNotAllowed("evil.example".into()).to_string(),
            "Certificate host not allowed: evil.example"
        );
    }
}
