//! Server-side signature verification through the provider API.
//!
//! Bounded retry with linear backoff. Transport errors, timeouts, 5xx, and
//! 401 (after dropping the cached token) are retried; other 4xx are final.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::webhook::{PostbackError, PostbackRequest, VerificationOutcome};
use crate::ports::RemoteSignatureVerifier;

use super::api_client::{PayPalApiClient, PaymentApiError};

/// How often to try the verification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl From<PaymentApiError> for PostbackError {
    fn from(err: PaymentApiError) -> Self {
        match err {
            PaymentApiError::Client(message) | PaymentApiError::Network(message) => {
                PostbackError::Network(message)
            }
            PaymentApiError::Timeout => PostbackError::Timeout,
            PaymentApiError::Status { status, .. } => PostbackError::Status(status),
            PaymentApiError::InvalidResponse(message) => PostbackError::UnexpectedResponse(message),
        }
    }
}

/// `RemoteSignatureVerifier` backed by the provider REST API.
pub struct PostbackSignatureVerifier {
    client: Arc<PayPalApiClient>,
    retry: RetryPolicy,
}

impl PostbackSignatureVerifier {
    pub fn new(client: Arc<PayPalApiClient>) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn attempt(&self, request: &PostbackRequest) -> Result<VerificationOutcome, PostbackError> {
        let token = self
            .client
            .access_token()
            .await
            .map_err(|e| PostbackError::Credentials(e.to_string()))?;

        let response = self.client.verify_webhook_signature(&token, request).await?;

        match response.verification_status.as_str() {
            "SUCCESS" => Ok(VerificationOutcome::Verified),
            "FAILURE" => Ok(VerificationOutcome::Failed),
            other => Err(PostbackError::UnexpectedResponse(format!(
                "verification_status {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl RemoteSignatureVerifier for PostbackSignatureVerifier {
    async fn verify_remote(
        &self,
        request: &PostbackRequest,
    ) -> Result<VerificationOutcome, PostbackError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.attempt(request).await {
                Ok(outcome) => return Ok(outcome),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    if err == PostbackError::Status(401) {
                        self.client.invalidate_token().await;
                    }
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        transmission_id = %request.transmission_id,
                        error = %err,
                        "Webhook verification call failed, retrying"
                    );
                    tokio::time::sleep(self.retry.delay_after(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
