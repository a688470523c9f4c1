//! Provider signing certificates and the URL policy for fetching them.

use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256};
use url::Url;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

use super::errors::{CertificateError, WebhookError};

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// Hosts the provider serves its webhook signing certificates from.
pub const DEFAULT_CERTIFICATE_HOSTS: [&str; 4] = [
    "api.paypal.com",
    "api-m.paypal.com",
    "api.sandbox.paypal.com",
    "api-m.sandbox.paypal.com",
];

/// A parsed signing certificate, reduced to the RSA key we verify with.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCertificate {
    public_key: RsaPublicKey,
}

impl ProviderCertificate {
    /// Parses the leaf certificate out of a PEM document.
    ///
    /// The provider serves a chain; the first block is the signing certificate.
    pub fn from_pem(pem: &str) -> Result<Self, CertificateError> {
        let leaf = first_pem_block(pem)
            .ok_or_else(|| CertificateError::Malformed("no PEM certificate block".to_string()))?;

        let certificate = Certificate::from_pem(leaf.as_bytes())
            .map_err(|e| CertificateError::Malformed(e.to_string()))?;
        let spki_der = certificate
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| CertificateError::Malformed(e.to_string()))?;
        let public_key = RsaPublicKey::from_public_key_der(&spki_der)
            .map_err(|e| CertificateError::Malformed(format!("not an RSA key: {}", e)))?;

        Ok(Self { public_key })
    }

    /// Checks an RSA PKCS#1 v1.5 SHA-256 signature over `message`.
    ///
    /// A signature that is not exactly one modulus long is malformed input,
    /// not a mismatch, and yields no verdict.
    pub fn verify_sha256(&self, message: &[u8], signature: &[u8]) -> Result<(), WebhookError> {
        let expected_len = self.public_key.size();
        if signature.len() != expected_len {
            return Err(WebhookError::indeterminate(format!(
                "signature is {} bytes, expected {}",
                signature.len(),
                expected_len
            )));
        }

        let hashed = Sha256::digest(message);
        self.public_key
            .verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
            .map_err(|_| WebhookError::VerificationFailed)
    }
}

fn first_pem_block(pem: &str) -> Option<&str> {
    let start = pem.find(PEM_BEGIN)?;
    let end = pem[start..].find(PEM_END)? + start + PEM_END.len();
    Some(&pem[start..end])
}

/// Which certificate URLs may be fetched.
///
/// The URL arrives in a request header, so it is attacker-controlled until
/// checked: https only, default port, no credentials, host on the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateUrlPolicy {
    allowed_hosts: Vec<String>,
}

impl CertificateUrlPolicy {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    pub fn validate(&self, raw: &str) -> Result<Url, CertificateError> {
        let url = Url::parse(raw.trim()).map_err(|e| CertificateError::InvalidUrl(e.to_string()))?;

        if url.scheme() != "https" {
            return Err(CertificateError::InsecureScheme(raw.to_string()));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(CertificateError::InvalidUrl(
                "credentials are not allowed in certificate URLs".to_string(),
            ));
        }
        if url.port().is_some() {
            return Err(CertificateError::InvalidUrl(
                "explicit ports are not allowed in certificate URLs".to_string(),
            ));
        }

        let host = url
            .host_str()
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| CertificateError::InvalidUrl("missing host".to_string()))?;
        if !self.allowed_hosts.iter().any(|allowed| *allowed == host) {
            return Err(CertificateError::HostNotAllowed(host));
        }

        Ok(url)
    }
}

impl Default for CertificateUrlPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CERTIFICATE_HOSTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    const CERT_PEM: &str = include_str!("../../../tests/fixtures/provider_cert.pem");
    const SIGNATURE: &str = include_str!("../../../tests/fixtures/capture_completed.sig");

    fn certificate() -> ProviderCertificate {
        ProviderCertificate::from_pem(CERT_PEM).unwrap()
    }

    fn fixture_signature() -> Vec<u8> {
        STANDARD.decode(SIGNATURE.trim()).unwrap()
    }

    #[test]
    fn parses_rsa_certificate() {
        assert!(ProviderCertificate::from_pem(CERT_PEM).is_ok());
    }

    #[test]
    fn wrong_message_is_a_mismatch() {
        let result =
            certificate().verify_sha256(b"not the canonical string", &fixture_signature());
        assert_eq!(result, Err(WebhookError::VerificationFailed));
    }

    #[test]
    fn short_signature_is_indeterminate() {
        let result = certificate().verify_sha256(b"anything", &[0u8; 10]);
        assert!(matches!(result, Err(WebhookError::VerificationIndeterminate(_))));
    }

    #[test]
    fn oversized_signature_is_indeterminate() {
        let mut signature = fixture_signature();
        signature.push(0);
        let result = certificate().verify_sha256(b"anything", &signature);
        assert!(matches!(result, Err(WebhookError::VerificationIndeterminate(_))));
    }

    #[test]
    fn parses_leaf_out_of_a_chain() {
        let chain = format!("{}\n{}", CERT_PEM, CERT_PEM);
        assert!(ProviderCertificate::from_pem(&chain).is_ok());
    }

    #[test]
    fn rejects_non_pem_input() {
        let result = ProviderCertificate::from_pem("<html>not found</html>");
        assert!(matches!(result, Err(CertificateError::Malformed(_))));
    }

    #[test]
    fn rejects_corrupted_pem_body() {
        let corrupted = format!("{}\nAAAAAAAA\n{}", PEM_BEGIN, PEM_END);
        let result = ProviderCertificate::from_pem(&corrupted);
        assert!(matches!(result, Err(CertificateError::Malformed(_))));
    }

    #[test]
    fn default_policy_accepts_provider_hosts() {
        let policy = CertificateUrlPolicy::default();

        for host in DEFAULT_CERTIFICATE_HOSTS {
            let url = format!("https://{}/v1/notifications/certs/CERT-360caa42", host);
            assert!(policy.validate(&url).is_ok(), "{} should be allowed", host);
        }
    }

    #[test]
    fn host_match_ignores_case() {
        let policy = CertificateUrlPolicy::default();
        assert!(policy
            .validate("https://API.PayPal.com/v1/notifications/certs/CERT-1")
            .is_ok());
    }

    #[test]
    fn rejects_foreign_hosts() {
        let policy = CertificateUrlPolicy::default();

        for url in [
            "https://evil.example.com/cert.pem",
            "https://api.paypal.com.evil.example/cert.pem",
            "https://169.254.169.254/latest/meta-data",
            "https://localhost/cert.pem",
        ] {
            assert!(
                matches!(policy.validate(url), Err(CertificateError::HostNotAllowed(_))),
                "{} should be rejected",
                url
            );
        }
    }

    #[test]
    fn rejects_plain_http() {
        let policy = CertificateUrlPolicy::default();
        let result = policy.validate("http://api.paypal.com/v1/notifications/certs/CERT-1");
        assert!(matches!(result, Err(CertificateError::InsecureScheme(_))));
    }

    #[test]
    fn rejects_credentials_and_ports() {
        let policy = CertificateUrlPolicy::default();

        assert!(policy
            .validate("https://user:pw@api.paypal.com/cert")
            .is_err());
        assert!(policy.validate("https://api.paypal.com:8443/cert").is_err());
    }

    #[test]
    fn rejects_unparseable_url() {
        let policy = CertificateUrlPolicy::default();
        assert!(matches!(
            policy.validate("not a url"),
            Err(CertificateError::InvalidUrl(_))
        ));
    }

    #[test]
    fn custom_hosts_are_normalized() {
        let policy = CertificateUrlPolicy::new([" Certs.Example.COM ", ""]);
        assert_eq!(policy.allowed_hosts(), &["certs.example.com".to_string()]);
    }
}
