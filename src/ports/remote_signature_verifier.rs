//! RemoteSignatureVerifier port - Provider-side signature check.

use async_trait::async_trait;

use crate::domain::webhook::{PostbackError, PostbackRequest, VerificationOutcome};

/// Port for asking the provider whether a delivery's signature is genuine.
///
/// Returns `Verified` or `Failed` when the provider gives a verdict. Anything
/// else is an error, which the verifier treats as indeterminate.
#[async_trait]
pub trait RemoteSignatureVerifier: Send + Sync {
    async fn verify_remote(
        &self,
        request: &PostbackRequest,
    ) -> Result<VerificationOutcome, PostbackError>;
}
