//! Transmission signature inputs.
//!
//! The provider signs `"{transmission_id}|{transmission_time}|{webhook_id}|{crc32}"`
//! where `crc32` is the unsigned decimal CRC-32 of the exact body bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::value::RawValue;

use super::envelope::EventEnvelope;
use super::errors::WebhookError;

pub const HEADER_AUTH_VERSION: &str = "paypal-auth-version";
pub const HEADER_AUTH_ALGO: &str = "paypal-auth-algo";
pub const HEADER_TRANSMISSION_ID: &str = "paypal-transmission-id";
pub const HEADER_TRANSMISSION_TIME: &str = "paypal-transmission-time";
pub const HEADER_TRANSMISSION_SIG: &str = "paypal-transmission-sig";
pub const HEADER_CERT_URL: &str = "paypal-cert-url";

/// CRC-32 (IEEE) of the body, as the provider computes it.
pub fn body_crc32(body: &[u8]) -> u32 {
    crc32fast::hash(body)
}

/// The string the provider signs.
pub fn canonical_string(
    transmission_id: &str,
    transmission_time: &str,
    webhook_id: &str,
    body: &[u8],
) -> String {
    format!(
        "{}|{}|{}|{}",
        transmission_id,
        transmission_time,
        webhook_id,
        body_crc32(body)
    )
}

/// Signature headers of one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmissionHeaders {
    pub auth_algo: String,
    pub transmission_id: String,
    pub transmission_time: String,
    pub transmission_sig: String,
    pub cert_url: String,
}

impl TransmissionHeaders {
    /// Extracts the signature headers. A missing one leaves the delivery unverifiable.
    pub fn from_envelope(envelope: &EventEnvelope) -> Result<Self, WebhookError> {
        let required = |name: &str| -> Result<String, WebhookError> {
            envelope
                .header(name)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| WebhookError::indeterminate(format!("missing header {}", name)))
        };

        Ok(Self {
            auth_algo: required(HEADER_AUTH_ALGO)?,
            transmission_id: required(HEADER_TRANSMISSION_ID)?,
            transmission_time: required(HEADER_TRANSMISSION_TIME)?,
            transmission_sig: required(HEADER_TRANSMISSION_SIG)?,
            cert_url: required(HEADER_CERT_URL)?,
        })
    }

    pub fn canonical_string(&self, webhook_id: &str, body: &[u8]) -> String {
        canonical_string(
            &self.transmission_id,
            &self.transmission_time,
            webhook_id,
            body,
        )
    }

    /// Base64-decodes the transmission signature.
    pub fn signature_bytes(&self) -> Result<Vec<u8>, WebhookError> {
        STANDARD
            .decode(self.transmission_sig.as_bytes())
            .map_err(|e| WebhookError::indeterminate(format!("undecodable signature: {}", e)))
    }
}

/// Body of the provider's server-side verification call.
///
/// `webhook_event` is the delivery body passed through unmodified so the
/// provider checks exactly what it signed.
#[derive(Debug, Clone, Serialize)]
pub struct PostbackRequest {
    pub auth_algo: String,
    pub cert_url: String,
    pub transmission_id: String,
    pub transmission_sig: String,
    pub transmission_time: String,
    pub webhook_id: String,
    pub webhook_event: Box<RawValue>,
}

impl PostbackRequest {
    pub fn new(
        headers: &TransmissionHeaders,
        webhook_id: &str,
        body: &[u8],
    ) -> Result<Self, WebhookError> {
        let text = std::str::from_utf8(body)
            .map_err(|_| WebhookError::indeterminate("body is not valid UTF-8"))?;
        let webhook_event = RawValue::from_string(text.to_string())
            .map_err(|e| WebhookError::indeterminate(format!("body is not JSON: {}", e)))?;

        Ok(Self {
            auth_algo: headers.auth_algo.clone(),
            cert_url: headers.cert_url.clone(),
            transmission_id: headers.transmission_id.clone(),
            transmission_sig: headers.transmission_sig.clone(),
            transmission_time: headers.transmission_time.clone(),
            webhook_id: webhook_id.to_string(),
            webhook_event,
        })
    }
}
