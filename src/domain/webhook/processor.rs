//! Webhook processor - runs one delivery through verify, audit, and dispatch.
//!
//! ## Design
//!
//! 1. Screen the delivery (`should_respond`) and verify it
//! 2. Append exactly one audit record with the outcome
//! 3. If verified, resolve the handler by normalized name and invoke it
//!
//! The audit record is always written before any handler side effect, and
//! nothing in here returns an error to the caller.

use std::sync::Arc;

use crate::domain::foundation::{StateMachine, ValidationError};
use crate::ports::{AuditRecord, WebhookAuditLog};

use super::delivery::DeliveryState;
use super::envelope::EventEnvelope;
use super::handler::HandlerRegistry;
use super::outcome::VerificationStatus;
use super::verifier::EventVerifier;

/// What happened to one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub state: DeliveryState,
    pub event_type: Option<String>,
    /// Name of the handler that was invoked, if any.
    pub handler: Option<String>,
    /// Set when the handler ran and reported an error.
    pub handler_error: Option<String>,
}

impl ProcessOutcome {
    fn new(state: DeliveryState, event_type: Option<String>) -> Self {
        Self {
            state,
            event_type,
            handler: None,
            handler_error: None,
        }
    }

    /// True when a handler ran to completion.
    pub fn handled(&self) -> bool {
        self.state == DeliveryState::Dispatched && self.handler_error.is_none()
    }

    /// Verification was indeterminate; another listener may be able to decide.
    pub fn try_next_listener(&self) -> bool {
        self.state == DeliveryState::Skipped
    }

    /// A cryptographic verdict was reached (verified or failed).
    pub fn verdict_reached(&self) -> bool {
        matches!(
            self.state,
            DeliveryState::Failed | DeliveryState::Verified | DeliveryState::Dispatched
        )
    }

    pub fn audit_status(&self) -> Option<VerificationStatus> {
        self.state.audit_status()
    }
}

/// Orchestrates one webhook listener.
pub struct WebhookProcessor {
    verifier: Arc<dyn EventVerifier>,
    audit_log: Arc<dyn WebhookAuditLog>,
    handlers: Arc<HandlerRegistry>,
}

impl WebhookProcessor {
    pub fn new(
        verifier: Arc<dyn EventVerifier>,
        audit_log: Arc<dyn WebhookAuditLog>,
        handlers: Arc<HandlerRegistry>,
    ) -> Self {
        Self {
            verifier,
            audit_log,
            handlers,
        }
    }

    /// Processes a delivery. Never fails.
    pub async fn process(&self, envelope: &EventEnvelope) -> ProcessOutcome {
        match self.run(envelope).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %err, "Webhook delivery reached an invalid state");
                ProcessOutcome::new(
                    DeliveryState::Skipped,
                    envelope.event_type().map(str::to_string),
                )
            }
        }
    }

    async fn run(&self, envelope: &EventEnvelope) -> Result<ProcessOutcome, ValidationError> {
        let state = DeliveryState::Received;
        let event_type = envelope.event_type().map(str::to_string);

        if !self.verifier.should_respond(envelope) {
            let state = state.transition_to(DeliveryState::Ignored)?;
            self.record(envelope, VerificationStatus::Ignored).await;
            return Ok(ProcessOutcome::new(state, event_type));
        }

        let verification = self.verifier.verify(envelope).await;
        let state = state.transition_to(DeliveryState::after_verification(verification))?;
        self.record(envelope, VerificationStatus::from(verification)).await;

        if state != DeliveryState::Verified {
            return Ok(ProcessOutcome::new(state, event_type));
        }

        let Some(event_type) = event_type else {
            return Ok(ProcessOutcome::new(state, None));
        };

        let handler = match self.handlers.resolve(&event_type) {
            Ok(handler) => handler,
            Err(err) => {
                tracing::debug!(event_type = %event_type, reason = %err, "No handler for webhook");
                return Ok(ProcessOutcome::new(state, Some(event_type)));
            }
        };

        let state = state.transition_to(DeliveryState::Dispatched)?;
        let handler_error = match handler.handle(envelope).await {
            Ok(()) => {
                tracing::info!(
                    event_type = %event_type,
                    handler = handler.name(),
                    "Webhook event handled"
                );
                None
            }
            Err(err) => {
                tracing::error!(
                    event_type = %event_type,
                    handler = handler.name(),
                    error = %err,
                    "Webhook handler failed"
                );
                Some(err.to_string())
            }
        };

        Ok(ProcessOutcome {
            state,
            event_type: Some(event_type),
            handler: Some(handler.name().to_string()),
            handler_error,
        })
    }

    /// Audit failures are logged and never change the verdict.
    async fn record(&self, envelope: &EventEnvelope, status: VerificationStatus) {
        let record = AuditRecord::from_envelope(envelope, status);
        if let Err(err) = self.audit_log.append(record).await {
            tracing::error!(
                status = %status,
                event_id = ?envelope.event_id(),
                error = %err,
                "Failed to write webhook audit record"
            );
        }
    }
}
