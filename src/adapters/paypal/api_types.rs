//! Provider REST API payloads.
//!
//! Only the fields this crate reads are modelled; unknown fields are ignored.

use serde::Deserialize;

/// Response of `POST /v1/oauth2/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub token_type: String,

    /// Lifetime in seconds.
    pub expires_in: u64,

    #[serde(default)]
    pub app_id: Option<String>,
}

/// Response of `POST /v1/notifications/verify-webhook-signature`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifySignatureResponse {
    /// `SUCCESS` or `FAILURE`.
    pub verification_status: String,
}

/// Error body returned by the REST API.
///
/// OAuth endpoints use `error`/`error_description`, everything else
/// `name`/`message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub error_description: Option<String>,
}

impl ApiErrorBody {
    /// Best human-readable summary, falling back to the raw body.
    pub fn summarize(raw: &str) -> String {
        let parsed: ApiErrorBody = serde_json::from_str(raw).unwrap_or_default();
        let name = parsed.name.or(parsed.error);
        let message = parsed.message.or(parsed.error_description);

        match (name, message) {
            (Some(name), Some(message)) => format!("{}: {}", name, message),
            (Some(name), None) => name,
            (None, Some(message)) => message,
            (None, None) => raw.chars().take(200).collect(),
        }
    }
}
