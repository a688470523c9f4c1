//! Lifecycle of a single webhook delivery through the pipeline.

use crate::domain::foundation::StateMachine;

use super::outcome::{VerificationOutcome, VerificationStatus};

/// States a delivery moves through.
///
/// ```text
/// Received ─┬─> Ignored      (not a provider webhook)
///           ├─> Skipped      (verification indeterminate)
///           ├─> Failed       (signature invalid)
///           └─> Verified ──> Dispatched
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryState {
    Received,
    Ignored,
    Skipped,
    Failed,
    Verified,
    Dispatched,
}

impl DeliveryState {
    /// The state reached from `Received` for a verification outcome.
    pub fn after_verification(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::Verified => DeliveryState::Verified,
            VerificationOutcome::Failed => DeliveryState::Failed,
            VerificationOutcome::Indeterminate => DeliveryState::Skipped,
        }
    }

    /// Audit status recorded for this state. `Received` has none.
    pub fn audit_status(&self) -> Option<VerificationStatus> {
        match self {
            DeliveryState::Received => None,
            DeliveryState::Ignored => Some(VerificationStatus::Ignored),
            DeliveryState::Skipped => Some(VerificationStatus::Skipped),
            DeliveryState::Failed => Some(VerificationStatus::Failed),
            DeliveryState::Verified | DeliveryState::Dispatched => {
                Some(VerificationStatus::Verified)
            }
        }
    }
}

impl StateMachine for DeliveryState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DeliveryState::*;
        matches!(
            (self, target),
            (Received, Ignored)
                | (Received, Skipped)
                | (Received, Failed)
                | (Received, Verified)
                | (Verified, Dispatched)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DeliveryState::*;
        match self {
            Received => vec![Ignored, Skipped, Failed, Verified],
            Verified => vec![Dispatched],
            Ignored | Skipped | Failed | Dispatched => vec![],
        }
    }
}
