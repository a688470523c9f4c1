//! Inbound webhook trust pipeline.
//!
//! An [`EventEnvelope`] is screened and verified by an [`EventVerifier`], audited,
//! and, when verified, dispatched through the [`HandlerRegistry`] by
//! [`WebhookProcessor`].

mod certificate;
mod delivery;
mod envelope;
mod errors;
mod handler;
mod outcome;
mod processor;
mod signature;
mod verifier;

pub use certificate::{CertificateUrlPolicy, ProviderCertificate, DEFAULT_CERTIFICATE_HOSTS};
pub use delivery::DeliveryState;
pub use envelope::{EventEnvelope, RequestHeaders};
pub use errors::{CertificateError, PostbackError, WebhookError};
pub use handler::{handler_name, HandlerRegistry, WebhookEventHandler};
pub use outcome::{VerificationOutcome, VerificationStatus};
pub use processor::{ProcessOutcome, WebhookProcessor};
pub use signature::{
    body_crc32, canonical_string, PostbackRequest, TransmissionHeaders, HEADER_AUTH_ALGO,
    HEADER_AUTH_VERSION, HEADER_CERT_URL, HEADER_TRANSMISSION_ID, HEADER_TRANSMISSION_SIG,
    HEADER_TRANSMISSION_TIME,
};
pub use verifier::{
    EventVerifier, WebhookVerifier, DEFAULT_NETWORK_TIMEOUT, PROVIDER_USER_AGENT_TOKEN,
};
