//! Signing certificate retrieval over HTTPS, with a TTL cache in front.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use crate::domain::webhook::{CertificateError, ProviderCertificate};
use crate::ports::CertificateFetcher;

/// Certificates are a few KiB; anything much larger is not one.
const MAX_CERTIFICATE_BYTES: usize = 64 * 1024;

pub const DEFAULT_CERTIFICATE_TTL: Duration = Duration::from_secs(3600);

/// Downloads and parses the PEM document at a certificate URL.
pub struct HttpCertificateFetcher {
    http_client: reqwest::Client,
}

impl HttpCertificateFetcher {
    pub fn new(timeout: Duration) -> Result<Self, CertificateError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| CertificateError::Fetch(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl CertificateFetcher for HttpCertificateFetcher {
    async fn fetch(&self, url: &Url) -> Result<Arc<ProviderCertificate>, CertificateError> {
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CertificateError::Timeout
                } else {
                    CertificateError::Fetch(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(CertificateError::Status(response.status().as_u16()));
        }

        let body = read_capped(response, MAX_CERTIFICATE_BYTES).await?;

        let pem = std::str::from_utf8(&body)
            .map_err(|_| CertificateError::Malformed("certificate is not UTF-8".to_string()))?;
        let certificate = ProviderCertificate::from_pem(pem)?;

        tracing::debug!(url = %url, "Fetched signing certificate");
        Ok(Arc::new(certificate))
    }
}

/// Reads the body, giving up as soon as it exceeds `limit` bytes.
async fn read_capped(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, CertificateError> {
    let too_large = |len: u64| {
        CertificateError::Malformed(format!(
            "certificate document exceeds {} bytes ({})",
            limit, len
        ))
    };

    if let Some(declared) = response.content_length() {
        if declared > limit as u64 {
            return Err(too_large(declared));
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| CertificateError::Fetch(e.to_string()))?
    {
        body.extend_from_slice(&chunk);
        if body.len() > limit {
            return Err(too_large(body.len() as u64));
        }
    }

    Ok(body)
}

struct CachedCertificate {
    certificate: Arc<ProviderCertificate>,
    fetched_at: Instant,
}

/// TTL cache keyed by certificate URL. Failures are never cached.
pub struct CachingCertificateFetcher {
    inner: Arc<dyn CertificateFetcher>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedCertificate>>,
}

impl CachingCertificateFetcher {
    pub fn new(inner: Arc<dyn CertificateFetcher>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl CertificateFetcher for CachingCertificateFetcher {
    async fn fetch(&self, url: &Url) -> Result<Arc<ProviderCertificate>, CertificateError> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(url.as_str()) {
                if entry.fetched_at.elapsed() < self.ttl {
                    return Ok(Arc::clone(&entry.certificate));
                }
            }
        }

        let certificate = self.inner.fetch(url).await?;

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
        entries.insert(
            url.as_str().to_string(),
            CachedCertificate {
                certificate: Arc::clone(&certificate),
                fetched_at: Instant::now(),
            },
        );

        Ok(certificate)
    }
}
