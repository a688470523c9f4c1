//! Outbound REST client for the payment provider.
//!
//! Obtains client-credentials access tokens, caching them encrypted per
//! client id, and calls the webhook signature verification endpoint.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::domain::token::{TokenCache, TokenCacheFactory};
use crate::domain::webhook::PostbackRequest;

use super::api_types::{ApiErrorBody, OAuthTokenResponse, VerifySignatureResponse};

pub const LIVE_API_BASE_URL: &str = "https://api-m.paypal.com";
pub const SANDBOX_API_BASE_URL: &str = "https://api-m.sandbox.paypal.com";

/// Cached tokens expire this long before the provider says they do.
pub const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

/// Errors from the provider REST API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentApiError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl PaymentApiError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PaymentApiError::Timeout
        } else {
            PaymentApiError::Network(err.to_string())
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PaymentApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// API credentials for one REST app.
#[derive(Clone)]
pub struct PayPalCredentials {
    client_id: String,
    client_secret: SecretString,
    api_base_url: String,
    request_timeout: Duration,
}

impl PayPalCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            api_base_url: SANDBOX_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Set the API base URL (live, sandbox, or a test server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

/// Provider REST client.
pub struct PayPalApiClient {
    credentials: PayPalCredentials,
    http_client: reqwest::Client,
    token_cache: TokenCache,
}

impl PayPalApiClient {
    /// Creates a client whose tokens are cached under `oauth:{client_id}`.
    pub fn new(
        credentials: PayPalCredentials,
        token_caches: &TokenCacheFactory,
    ) -> Result<Self, PaymentApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(credentials.request_timeout)
            .build()
            .map_err(|e| PaymentApiError::Client(e.to_string()))?;
        let token_cache = token_caches.for_session(Self::token_session_key(&credentials.client_id));

        Ok(Self {
            credentials,
            http_client,
            token_cache,
        })
    }

    pub fn token_session_key(client_id: &str) -> String {
        format!("oauth:{}", client_id)
    }

    /// Returns a valid access token, from cache when possible.
    pub async fn access_token(&self) -> Result<SecretString, PaymentApiError> {
        if let Some(token) = self.token_cache.get().await {
            return Ok(SecretString::new(token));
        }

        let url = format!("{}/v1/oauth2/token", self.credentials.api_base_url);
        let response = self
            .http_client
            .post(&url)
            .basic_auth(
                &self.credentials.client_id,
                Some(self.credentials.client_secret.expose_secret()),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(PaymentApiError::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status, error = %error_text, "OAuth token request failed");
            return Err(PaymentApiError::Status {
                status,
                message: ApiErrorBody::summarize(&error_text),
            });
        }

        let token: OAuthTokenResponse = response
            .json()
            .await
            .map_err(|e| PaymentApiError::InvalidResponse(e.to_string()))?;

        let ttl = token.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);
        if ttl > 0 {
            if let Err(err) = self.token_cache.save(&token.access_token, ttl).await {
                tracing::warn!(error = %err, "Could not cache access token");
            }
        }

        tracing::debug!(
            client_id = %self.credentials.client_id,
            expires_in = token.expires_in,
            "Obtained access token"
        );
        Ok(SecretString::new(token.access_token))
    }

    /// Drops the cached token, e.g. after the API rejected it.
    pub async fn invalidate_token(&self) {
        self.token_cache.clear().await;
    }

    /// Asks the provider to verify a webhook signature.
    pub async fn verify_webhook_signature(
        &self,
        access_token: &SecretString,
        request: &PostbackRequest,
    ) -> Result<VerifySignatureResponse, PaymentApiError> {
        let url = format!(
            "{}/v1/notifications/verify-webhook-signature",
            self.credentials.api_base_url
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(PaymentApiError::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PaymentApiError::Status {
                status,
                message: ApiErrorBody::summarize(&error_text),
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentApiError::InvalidResponse(e.to_string()))
    }
}
