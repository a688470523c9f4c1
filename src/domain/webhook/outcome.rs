//! Verification results and audit statuses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Result of trying to authenticate a delivery.
///
/// `Indeterminate` means no cryptographic verdict could be reached
/// (network, certificate, or missing-input problems). It is never a
/// security incident; only `Failed` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationOutcome {
    Verified,
    Failed,
    Indeterminate,
}

/// Status column of the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Verified,
    Failed,
    Ignored,
    Skipped,
}

impl VerificationStatus {
    pub const ALL: [VerificationStatus; 4] = [
        VerificationStatus::Verified,
        VerificationStatus::Failed,
        VerificationStatus::Ignored,
        VerificationStatus::Skipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "verified",
            VerificationStatus::Failed => "failed",
            VerificationStatus::Ignored => "ignored",
            VerificationStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verified" => Ok(VerificationStatus::Verified),
            "failed" => Ok(VerificationStatus::Failed),
            "ignored" => Ok(VerificationStatus::Ignored),
            "skipped" => Ok(VerificationStatus::Skipped),
            other => Err(ValidationError::invalid_format(
                "verification_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

impl From<VerificationOutcome> for VerificationStatus {
    fn from(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::Verified => VerificationStatus::Verified,
            VerificationOutcome::Failed => VerificationStatus::Failed,
            VerificationOutcome::Indeterminate => VerificationStatus::Skipped,
        }
    }
}
