//! Webhook verifier - decides whether a delivery came from the provider.
//!
//! ## Verification order
//!
//! 1. `should_respond` screens out requests that are not provider webhooks.
//! 2. The certificate path checks the RSA-SHA256 transmission signature locally.
//! 3. Only if step 2 is indeterminate, the provider's verification endpoint is
//!    asked instead (when configured).
//!
//! Every failure short of a signature mismatch is `Indeterminate`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::ports::{CertificateFetcher, RemoteSignatureVerifier, WebhookIdSource};

use super::certificate::CertificateUrlPolicy;
use super::envelope::EventEnvelope;
use super::errors::{CertificateError, PostbackError, WebhookError};
use super::outcome::VerificationOutcome;
use super::signature::{
    PostbackRequest, TransmissionHeaders, HEADER_AUTH_ALGO, HEADER_AUTH_VERSION,
};

/// Substring the provider puts in its `User-Agent`.
pub const PROVIDER_USER_AGENT_TOKEN: &str = "PayPal/";

pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(5);

/// Authenticates inbound deliveries.
#[async_trait]
pub trait EventVerifier: Send + Sync {
    /// Cheap structural check. Never does I/O.
    fn should_respond(&self, envelope: &EventEnvelope) -> bool;

    /// Reaches a verdict, or `Indeterminate` when none is possible.
    async fn verify(&self, envelope: &EventEnvelope) -> VerificationOutcome;
}

/// Provider webhook verifier with certificate and postback paths.
pub struct WebhookVerifier {
    webhook_ids: Arc<dyn WebhookIdSource>,
    certificates: Arc<dyn CertificateFetcher>,
    url_policy: CertificateUrlPolicy,
    fallback: Option<Arc<dyn RemoteSignatureVerifier>>,
    network_timeout: Duration,
}

impl WebhookVerifier {
    pub fn new(
        webhook_ids: Arc<dyn WebhookIdSource>,
        certificates: Arc<dyn CertificateFetcher>,
    ) -> Self {
        Self {
            webhook_ids,
            certificates,
            url_policy: CertificateUrlPolicy::default(),
            fallback: None,
            network_timeout: DEFAULT_NETWORK_TIMEOUT,
        }
    }

    pub fn with_url_policy(mut self, policy: CertificateUrlPolicy) -> Self {
        self.url_policy = policy;
        self
    }

    /// Enables the server-side verification fallback.
    pub fn with_fallback(mut self, fallback: Arc<dyn RemoteSignatureVerifier>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_network_timeout(mut self, network_timeout: Duration) -> Self {
        self.network_timeout = network_timeout;
        self
    }

    async fn webhook_id(&self) -> Result<String, WebhookError> {
        self.webhook_ids
            .webhook_id()
            .await
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| WebhookError::indeterminate("no webhook id configured"))
    }

    /// Local check against the provider's signing certificate.
    async fn verify_with_certificate(&self, envelope: &EventEnvelope) -> Result<(), WebhookError> {
        let headers = TransmissionHeaders::from_envelope(envelope)?;
        if !headers.auth_algo.to_ascii_uppercase().contains("SHA256") {
            return Err(WebhookError::indeterminate(format!(
                "unsupported auth algorithm {}",
                headers.auth_algo
            )));
        }

        let webhook_id = self.webhook_id().await?;
        let url = self.url_policy.validate(&headers.cert_url)?;
        let signature = headers.signature_bytes()?;

        let certificate = timeout(self.network_timeout, self.certificates.fetch(&url))
            .await
            .map_err(|_| CertificateError::Timeout)??;

        let message = headers.canonical_string(&webhook_id, envelope.raw_body());
        certificate.verify_sha256(message.as_bytes(), &signature)
    }

    /// Asks the provider to check the signature.
    async fn verify_with_postback(
        &self,
        envelope: &EventEnvelope,
        fallback: &dyn RemoteSignatureVerifier,
    ) -> Result<VerificationOutcome, WebhookError> {
        let headers = TransmissionHeaders::from_envelope(envelope)?;
        let webhook_id = self.webhook_id().await?;
        let request = PostbackRequest::new(&headers, &webhook_id, envelope.raw_body())?;

        let outcome = timeout(self.network_timeout, fallback.verify_remote(&request))
            .await
            .map_err(|_| PostbackError::Timeout)??;
        Ok(outcome)
    }
}

/// Structural screen shared by `should_respond` and `verify`.
fn screen(envelope: &EventEnvelope) -> Result<(), WebhookError> {
    for header in [HEADER_AUTH_VERSION, HEADER_AUTH_ALGO] {
        if !envelope.headers().has_value(header) {
            return Err(WebhookError::MalformedOrForeignRequest(format!(
                "missing header {}",
                header
            )));
        }
    }
    if envelope.event_type().is_none() {
        return Err(WebhookError::MalformedOrForeignRequest(
            "body has no event_type".to_string(),
        ));
    }
    if !envelope.user_agent().contains(PROVIDER_USER_AGENT_TOKEN) {
        return Err(WebhookError::MalformedOrForeignRequest(format!(
            "unexpected user agent {:?}",
            envelope.user_agent()
        )));
    }
    Ok(())
}

#[async_trait]
impl EventVerifier for WebhookVerifier {
    fn should_respond(&self, envelope: &EventEnvelope) -> bool {
        screen(envelope).is_ok()
    }

    async fn verify(&self, envelope: &EventEnvelope) -> VerificationOutcome {
        if let Err(err) = screen(envelope) {
            tracing::debug!(reason = %err, "Not verifying request");
            return VerificationOutcome::Indeterminate;
        }

        let event_id = envelope.event_id().unwrap_or_default();
        let summary = envelope.summary().unwrap_or_default();

        let reason = match self.verify_with_certificate(envelope).await {
            Ok(()) => {
                tracing::debug!(
                    event_id = %event_id,
                    summary = %summary,
                    "Webhook signature verified locally"
                );
                return VerificationOutcome::Verified;
            }
            Err(err) if err.is_security_event() => {
                tracing::warn!(
                    event_id = %event_id,
                    event_type = ?envelope.event_type(),
                    summary = %summary,
                    reason = %err,
                    "Webhook signature mismatch - possible forged delivery"
                );
                return VerificationOutcome::Failed;
            }
            Err(err) => err,
        };

        let Some(fallback) = self.fallback.as_deref() else {
            tracing::info!(
                event_id = %event_id,
                reason = %reason,
                "Webhook verification indeterminate, no fallback configured"
            );
            return VerificationOutcome::Indeterminate;
        };

        tracing::debug!(
            event_id = %event_id,
            reason = %reason,
            "Certificate verification indeterminate, asking provider"
        );

        match self.verify_with_postback(envelope, fallback).await {
            Ok(VerificationOutcome::Failed) => {
                tracing::warn!(
                    event_id = %event_id,
                    event_type = ?envelope.event_type(),
                    summary = %summary,
                    "Provider rejected webhook signature - possible forged delivery"
                );
                VerificationOutcome::Failed
            }
            Ok(outcome) => {
                tracing::debug!(
                    event_id = %event_id,
                    summary = %summary,
                    outcome = ?outcome,
                    "Provider verification answered"
                );
                outcome
            }
            Err(err) => {
                tracing::info!(
                    event_id = %event_id,
                    reason = %err,
                    "Webhook verification indeterminate"
                );
                VerificationOutcome::Indeterminate
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::webhook::certificate::ProviderCertificate;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use crate::domain::webhook::envelope::RequestHeaders;
    use std::sync::atomic::{AtomicU32, Ordering};
    use url::Url;

    const CERT_PEM: &str = include_str!("../../../tests/fixtures/provider_cert.pem");
    const BODY: &[u8] = include_bytes!("../../../tests/fixtures/capture_completed.json");
    const SIGNATURE: &str = include_str!("../../../tests/fixtures/capture_completed.sig");
    const WEBHOOK_ID: &str = "1JE4291016473214C";
    const CERT_URL: &str = "https://api.paypal.com/v1/notifications/certs/CERT-360caa42";

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    struct StaticWebhookId(Option<&'static str>);

    #[async_trait]
    impl WebhookIdSource for StaticWebhookId {
        async fn webhook_id(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    struct FixtureCertificates {
        calls: AtomicU32,
    }

    impl FixtureCertificates {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl CertificateFetcher for FixtureCertificates {
        async fn fetch(&self, _url: &Url) -> Result<Arc<ProviderCertificate>, CertificateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ProviderCertificate::from_pem(CERT_PEM).map(Arc::new)
        }
    }

    struct UnreachableCertificates;

    #[async_trait]
    impl CertificateFetcher for UnreachableCertificates {
        async fn fetch(&self, _url: &Url) -> Result<Arc<ProviderCertificate>, CertificateError> {
            Err(CertificateError::Fetch("connection refused".into()))
        }
    }

    struct SlowCertificates;

    #[async_trait]
    impl CertificateFetcher for SlowCertificates {
        async fn fetch(&self, _url: &Url) -> Result<Arc<ProviderCertificate>, CertificateError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            ProviderCertificate::from_pem(CERT_PEM).map(Arc::new)
        }
    }

    struct ScriptedFallback {
        result: Result<VerificationOutcome, PostbackError>,
        calls: AtomicU32,
    }

    impl ScriptedFallback {
        fn new(result: Result<VerificationOutcome, PostbackError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl RemoteSignatureVerifier for ScriptedFallback {
        async fn verify_remote(
            &self,
            request: &PostbackRequest,
        ) -> Result<VerificationOutcome, PostbackError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(request.webhook_id, WEBHOOK_ID);
            self.result.clone()
        }
    }

    fn provider_headers(signature: &str) -> RequestHeaders {
        [
            ("PAYPAL-AUTH-VERSION", "v2"),
            ("PAYPAL-AUTH-ALGO", "SHA256withRSA"),
            ("PAYPAL-TRANSMISSION-ID", "69cd13f0-d67a-11e5-baa3-778b53f4ae55"),
            ("PAYPAL-TRANSMISSION-TIME", "2016-02-18T20:01:35Z"),
            ("PAYPAL-TRANSMISSION-SIG", signature.trim()),
            ("PAYPAL-CERT-URL", CERT_URL),
            ("User-Agent", "PayPal/AUHD-214.0-52392296"),
        ]
        .into_iter()
        .collect()
    }

    fn signed_envelope() -> EventEnvelope {
        EventEnvelope::from_request("POST", provider_headers(SIGNATURE), BODY)
    }

    fn verifier(certificates: Arc<dyn CertificateFetcher>) -> WebhookVerifier {
        WebhookVerifier::new(Arc::new(StaticWebhookId(Some(WEBHOOK_ID))), certificates)
    }

    // ══════════════════════════════════════════════════════════════
    // should_respond
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn responds_to_provider_deliveries() {
        let verifier = verifier(FixtureCertificates::new());
        assert!(verifier.should_respond(&signed_envelope()));
    }

    #[tokio::test]
    async fn missing_auth_version_is_not_ours() {
        let mut headers = provider_headers(SIGNATURE);
        headers.insert("PAYPAL-AUTH-VERSION", "");
        let envelope = EventEnvelope::from_request("POST", headers, BODY);
        let certificates = FixtureCertificates::new();
        let verifier = verifier(certificates.clone());

        assert!(!verifier.should_respond(&envelope));
        assert_eq!(
            verifier.verify(&envelope).await,
            VerificationOutcome::Indeterminate
        );
        assert_eq!(certificates.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn foreign_user_agent_is_not_ours() {
        let envelope = EventEnvelope::new("POST", provider_headers(SIGNATURE), BODY, "curl/8.0");
        assert!(!verifier(FixtureCertificates::new()).should_respond(&envelope));
    }

    #[test]
    fn body_without_event_type_is_not_ours() {
        let envelope =
            EventEnvelope::from_request("POST", provider_headers(SIGNATURE), r#"{"id":"WH-1"}"#);
        assert!(!verifier(FixtureCertificates::new()).should_respond(&envelope));
    }

    #[test]
    fn screen_names_the_missing_piece() {
        let mut headers = provider_headers(SIGNATURE);
        headers.insert("PAYPAL-AUTH-ALGO", " ");
        let envelope = EventEnvelope::from_request("POST", headers, BODY);

        let err = screen(&envelope).unwrap_err();
        assert_eq!(
            err,
            WebhookError::MalformedOrForeignRequest(format!("missing header {}", HEADER_AUTH_ALGO))
        );
        assert!(!err.is_security_event());
    }

    // ══════════════════════════════════════════════════════════════
    // Certificate path
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn valid_signature_is_verified() {
        let verifier = verifier(FixtureCertificates::new());
        assert_eq!(
            verifier.verify(&signed_envelope()).await,
            VerificationOutcome::Verified
        );
    }

    #[tokio::test]
    async fn tampered_body_fails() {
        let mut body = BODY.to_vec();
        body[10] ^= 0x01;
        let envelope = EventEnvelope::from_request("POST", provider_headers(SIGNATURE), body);

        // The flipped byte sits in the event id, so the envelope still parses.
        assert!(envelope.event_type().is_some());
        assert_eq!(
            verifier(FixtureCertificates::new()).verify(&envelope).await,
            VerificationOutcome::Failed
        );
    }

    #[tokio::test]
    async fn flipped_signature_bit_fails() {
        let mut signature = STANDARD.decode(SIGNATURE.trim()).unwrap();
        signature[5] ^= 0x01;
        let envelope = EventEnvelope::from_request(
            "POST",
            provider_headers(&STANDARD.encode(signature)),
            BODY,
        );

        assert_eq!(
            verifier(FixtureCertificates::new()).verify(&envelope).await,
            VerificationOutcome::Failed
        );
    }

    #[tokio::test]
    async fn truncated_signature_is_indeterminate() {
        let signature = STANDARD.decode(SIGNATURE.trim()).unwrap();
        let envelope = EventEnvelope::from_request(
            "POST",
            provider_headers(&STANDARD.encode(&signature[..10])),
            BODY,
        );

        assert_eq!(
            verifier(FixtureCertificates::new()).verify(&envelope).await,
            VerificationOutcome::Indeterminate
        );
    }

    #[tokio::test]
    async fn wrong_webhook_id_fails() {
        let verifier = WebhookVerifier::new(
            Arc::new(StaticWebhookId(Some("SOME-OTHER-ID"))),
            FixtureCertificates::new(),
        );
        assert_eq!(
            verifier.verify(&signed_envelope()).await,
            VerificationOutcome::Failed
        );
    }

    #[tokio::test]
    async fn failed_verdict_never_consults_fallback() {
        let fallback = ScriptedFallback::new(Ok(VerificationOutcome::Verified));
        let verifier = WebhookVerifier::new(
            Arc::new(StaticWebhookId(Some("SOME-OTHER-ID"))),
            FixtureCertificates::new(),
        )
        .with_fallback(fallback.clone());

        assert_eq!(
            verifier.verify(&signed_envelope()).await,
            VerificationOutcome::Failed
        );
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn undecodable_signature_is_indeterminate() {
        let envelope = EventEnvelope::from_request("POST", provider_headers("!!not-base64!!"), BODY);
        assert_eq!(
            verifier(FixtureCertificates::new()).verify(&envelope).await,
            VerificationOutcome::Indeterminate
        );
    }

    #[tokio::test]
    async fn missing_webhook_id_is_indeterminate() {
        let verifier = WebhookVerifier::new(
            Arc::new(StaticWebhookId(None)),
            FixtureCertificates::new(),
        );
        assert_eq!(
            verifier.verify(&signed_envelope()).await,
            VerificationOutcome::Indeterminate
        );
    }

    #[tokio::test]
    async fn disallowed_certificate_host_is_never_fetched() {
        let mut headers = provider_headers(SIGNATURE);
        headers.insert("PAYPAL-CERT-URL", "https://evil.example.com/cert.pem");
        let envelope = EventEnvelope::from_request("POST", headers, BODY);
        let certificates = FixtureCertificates::new();

        assert_eq!(
            verifier(certificates.clone()).verify(&envelope).await,
            VerificationOutcome::Indeterminate
        );
        assert_eq!(certificates.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn certificate_fetch_timeout_is_indeterminate() {
        let verifier = verifier(Arc::new(SlowCertificates))
            .with_network_timeout(Duration::from_millis(50));

        assert_eq!(
            verifier.verify(&signed_envelope()).await,
            VerificationOutcome::Indeterminate
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Fallback path
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn fallback_success_verifies() {
        let fallback = ScriptedFallback::new(Ok(VerificationOutcome::Verified));
        let verifier = verifier(Arc::new(UnreachableCertificates)).with_fallback(fallback.clone());

        assert_eq!(
            verifier.verify(&signed_envelope()).await,
            VerificationOutcome::Verified
        );
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fallback_failure_fails() {
        let fallback = ScriptedFallback::new(Ok(VerificationOutcome::Failed));
        let verifier = verifier(Arc::new(UnreachableCertificates)).with_fallback(fallback);

        assert_eq!(
            verifier.verify(&signed_envelope()).await,
            VerificationOutcome::Failed
        );
    }

    #[tokio::test]
    async fn fallback_error_is_indeterminate() {
        let fallback = ScriptedFallback::new(Err(PostbackError::Status(503)));
        let verifier = verifier(Arc::new(UnreachableCertificates)).with_fallback(fallback);

        assert_eq!(
            verifier.verify(&signed_envelope()).await,
            VerificationOutcome::Indeterminate
        );
    }

    #[tokio::test]
    async fn without_fallback_unreachable_certificate_is_indeterminate() {
        let verifier = verifier(Arc::new(UnreachableCertificates));
        assert_eq!(
            verifier.verify(&signed_envelope()).await,
            VerificationOutcome::Indeterminate
        );
    }
}
