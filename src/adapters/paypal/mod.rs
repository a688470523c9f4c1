//! Payment provider (PayPal REST) adapters.
//!
//! - Signing certificate retrieval with a TTL cache
//! - OAuth client-credentials access tokens, cached encrypted per client id
//! - Server-side webhook signature verification (fallback path)
//! - Webhook id from configuration
//!
//! All secrets are handled via `secrecy::SecretString`.

mod api_client;
mod api_types;
mod certificate_client;
mod postback_verifier;
mod webhook_id;

pub use api_client::{
    PayPalApiClient, PayPalCredentials, PaymentApiError, LIVE_API_BASE_URL,
    SANDBOX_API_BASE_URL, TOKEN_EXPIRY_MARGIN_SECS,
};
pub use api_types::{ApiErrorBody, OAuthTokenResponse, VerifySignatureResponse};
pub use certificate_client::{
    CachingCertificateFetcher, HttpCertificateFetcher, DEFAULT_CERTIFICATE_TTL,
};
pub use postback_verifier::{PostbackSignatureVerifier, RetryPolicy};
pub use webhook_id::ConfiguredWebhookId;
