//! PayPal configuration (webhook verification and REST API)

use serde::Deserialize;
use std::time::Duration;

use crate::domain::webhook::DEFAULT_CERTIFICATE_HOSTS;

use super::error::ValidationError;

/// Provider settings.
///
/// The REST credentials are optional: without them the postback fallback is
/// disabled and deliveries that cannot be checked against the certificate
/// stay indeterminate.
#[derive(Debug, Clone, Deserialize)]
pub struct PayPalConfig {
    /// REST app client id
    pub client_id: Option<String>,

    /// REST app secret
    pub client_secret: Option<String>,

    /// Id of the webhook subscription deliveries are signed for
    pub webhook_id: Option<String>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Certificate hosts (comma-separated). Defaults to the provider's API hosts.
    pub allowed_cert_hosts: Option<String>,

    /// Bound on each certificate fetch and postback call, in seconds
    #[serde(default = "default_network_timeout")]
    pub network_timeout_secs: u64,

    #[serde(default = "default_cert_cache_ttl")]
    pub cert_cache_ttl_secs: u64,

    #[serde(default = "default_postback_max_attempts")]
    pub postback_max_attempts: u32,

    #[serde(default = "default_postback_backoff_ms")]
    pub postback_backoff_ms: u64,
}

impl PayPalConfig {
    /// Client id and secret, when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        }
    }

    pub fn cert_hosts_list(&self) -> Vec<String> {
        match &self.allowed_cert_hosts {
            Some(hosts) => hosts
                .split(',')
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect(),
            None => DEFAULT_CERTIFICATE_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }

    pub fn cert_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cert_cache_ttl_secs)
    }

    pub fn postback_backoff(&self) -> Duration {
        Duration::from_millis(self.postback_backoff_ms)
    }

    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.api_base_url.starts_with("https://") {
            return Err(ValidationError::InvalidApiBaseUrl);
        }

        let hosts = self.cert_hosts_list();
        if hosts.is_empty() {
            return Err(ValidationError::NoCertificateHosts);
        }
        if let Some(bad) = hosts
            .iter()
            .find(|h| h.contains(|c: char| c == '/' || c == ':' || c == '@' || c.is_whitespace()))
        {
            return Err(ValidationError::InvalidCertificateHost(bad.clone()));
        }

        if self.network_timeout_secs == 0 || self.network_timeout_secs > 30 {
            return Err(ValidationError::InvalidNetworkTimeout);
        }
        if self.postback_max_attempts == 0 || self.postback_max_attempts > 5 {
            return Err(ValidationError::InvalidPostbackAttempts);
        }
        Ok(())
    }
}

impl Default for PayPalConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            webhook_id: None,
            api_base_url: default_api_base_url(),
            allowed_cert_hosts: None,
            network_timeout_secs: default_network_timeout(),
            cert_cache_ttl_secs: default_cert_cache_ttl(),
            postback_max_attempts: default_postback_max_attempts(),
            postback_backoff_ms: default_postback_backoff_ms(),
        }
    }
}

fn default_api_base_url() -> String {
    crate::adapters::paypal::SANDBOX_API_BASE_URL.to_string()
}

fn default_network_timeout() -> u64 {
    5
}

fn default_cert_cache_ttl() -> u64 {
    3600
}

fn default_postback_max_attempts() -> u32 {
    2
}

fn default_postback_backoff_ms() -> u64 {
    250
}
