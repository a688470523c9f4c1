//! CertificateFetcher port - Retrieves provider signing certificates.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::domain::webhook::{CertificateError, ProviderCertificate};

/// Port for loading a signing certificate from an already-validated URL.
///
/// Implementations may cache; the verifier applies its own timeout around
/// each call.
#[async_trait]
pub trait CertificateFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Arc<ProviderCertificate>, CertificateError>;
}
