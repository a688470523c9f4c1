//! Ordered chain of webhook listeners.
//!
//! Listeners are tried in registration order. The first one that reaches
//! anything other than an indeterminate result owns the delivery; the rest
//! are not consulted. A chain in which every listener was indeterminate
//! asks the provider to redeliver.

use std::sync::Arc;

use crate::domain::webhook::{DeliveryState, EventEnvelope, ProcessOutcome, WebhookProcessor};

/// How the chain disposed of one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainDecision {
    /// A listener reached a result other than indeterminate.
    Decided {
        listener: String,
        outcome: ProcessOutcome,
    },
    /// No listener could decide (or there were none).
    Indeterminate,
}

impl ChainDecision {
    /// HTTP status to answer the provider with.
    ///
    /// - 200: a verdict was reached, whether or not the signature matched
    /// - 202: the request was not a provider webhook
    /// - 503: nobody could decide, so the provider should redeliver
    pub fn status_code(&self) -> u16 {
        match self {
            ChainDecision::Decided { outcome, .. } if outcome.state == DeliveryState::Ignored => {
                202
            }
            ChainDecision::Decided { .. } => 200,
            ChainDecision::Indeterminate => 503,
        }
    }

    pub fn outcome(&self) -> Option<&ProcessOutcome> {
        match self {
            ChainDecision::Decided { outcome, .. } => Some(outcome),
            ChainDecision::Indeterminate => None,
        }
    }

    pub fn listener(&self) -> Option<&str> {
        match self {
            ChainDecision::Decided { listener, .. } => Some(listener),
            ChainDecision::Indeterminate => None,
        }
    }
}

struct Listener {
    name: String,
    processor: Arc<WebhookProcessor>,
}

/// Runs processors in order until one decides.
#[derive(Default)]
pub struct WebhookListenerChain {
    listeners: Vec<Listener>,
}

impl WebhookListenerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(mut self, name: impl Into<String>, processor: Arc<WebhookProcessor>) -> Self {
        self.listeners.push(Listener {
            name: name.into(),
            processor,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub async fn dispatch(&self, envelope: &EventEnvelope) -> ChainDecision {
        for listener in &self.listeners {
            let outcome = listener.processor.process(envelope).await;

            if outcome.try_next_listener() {
                tracing::debug!(listener = %listener.name, "Listener indeterminate, trying next");
                continue;
            }

            tracing::info!(
                listener = %listener.name,
                state = ?outcome.state,
                event_type = outcome.event_type.as_deref().unwrap_or("-"),
                handler = outcome.handler.as_deref().unwrap_or("-"),
                "Webhook delivery decided"
            );
            return ChainDecision::Decided {
                listener: listener.name.clone(),
                outcome,
            };
        }

        tracing::warn!(
            listeners = self.listeners.len(),
            "No listener could verify webhook delivery"
        );
        ChainDecision::Indeterminate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryAuditLog;
    use crate::domain::webhook::{
        EventVerifier, HandlerRegistry, RequestHeaders, VerificationOutcome, VerificationStatus,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    struct FixedVerifier {
        respond: bool,
        outcome: VerificationOutcome,
        calls: AtomicU32,
    }

    impl FixedVerifier {
        fn new(respond: bool, outcome: VerificationOutcome) -> Arc<Self> {
            Arc::new(Self {
                respond,
                outcome,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl EventVerifier for FixedVerifier {
        fn should_respond(&self, _envelope: &EventEnvelope) -> bool {
            self.respond
        }

        async fn verify(&self, _envelope: &EventEnvelope) -> VerificationOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
        }
    }

    fn processor(verifier: Arc<FixedVerifier>, audit: Arc<InMemoryAuditLog>) -> Arc<WebhookProcessor> {
        Arc::new(WebhookProcessor::new(
            verifier,
            audit,
            Arc::new(HandlerRegistry::new()),
        ))
    }

    fn envelope() -> EventEnvelope {
        EventEnvelope::from_request(
            "POST",
            RequestHeaders::new(),
            r#"{"id":"WH-1","event_type":"PAYMENT.CAPTURE.COMPLETED"}"#,
        )
    }

    // ══════════════════════════════════════════════════════════════
    // Ordering
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn first_decisive_listener_wins() {
        let audit = Arc::new(InMemoryAuditLog::new());
        let undecided = FixedVerifier::new(true, VerificationOutcome::Indeterminate);
        let deciding = FixedVerifier::new(true, VerificationOutcome::Failed);
        let never = FixedVerifier::new(true, VerificationOutcome::Verified);

        let chain = WebhookListenerChain::new()
            .with_listener("legacy", processor(undecided.clone(), audit.clone()))
            .with_listener("paypal", processor(deciding.clone(), audit.clone()))
            .with_listener("spare", processor(never.clone(), audit.clone()));

        let decision = chain.dispatch(&envelope()).await;

        assert_eq!(decision.listener(), Some("paypal"));
        assert_eq!(decision.status_code(), 200);
        assert_eq!(never.calls.load(Ordering::SeqCst), 0);
        assert_eq!(audit.count().await, 2);
        assert_eq!(audit.count_with_status(VerificationStatus::Skipped).await, 1);
        assert_eq!(audit.count_with_status(VerificationStatus::Failed).await, 1);
    }

    #[tokio::test]
    async fn ignored_delivery_stops_the_chain_with_202() {
        let audit = Arc::new(InMemoryAuditLog::new());
        let foreign = FixedVerifier::new(false, VerificationOutcome::Verified);
        let never = FixedVerifier::new(true, VerificationOutcome::Verified);

        let chain = WebhookListenerChain::new()
            .with_listener("paypal", processor(foreign.clone(), audit.clone()))
            .with_listener("spare", processor(never.clone(), audit.clone()));

        let decision = chain.dispatch(&envelope()).await;

        assert_eq!(decision.status_code(), 202);
        assert_eq!(foreign.calls.load(Ordering::SeqCst), 0);
        assert_eq!(never.calls.load(Ordering::SeqCst), 0);
        assert_eq!(audit.count_with_status(VerificationStatus::Ignored).await, 1);
    }

    #[tokio::test]
    async fn all_indeterminate_is_503() {
        let audit = Arc::new(InMemoryAuditLog::new());
        let chain = WebhookListenerChain::new()
            .with_listener(
                "a",
                processor(FixedVerifier::new(true, VerificationOutcome::Indeterminate), audit.clone()),
            )
            .with_listener(
                "b",
                processor(FixedVerifier::new(true, VerificationOutcome::Indeterminate), audit.clone()),
            );

        let decision = chain.dispatch(&envelope()).await;

        assert_eq!(decision, ChainDecision::Indeterminate);
        assert_eq!(decision.status_code(), 503);
        assert_eq!(audit.count_with_status(VerificationStatus::Skipped).await, 2);
    }

    #[tokio::test]
    async fn empty_chain_cannot_decide() {
        let chain = WebhookListenerChain::new();

        assert!(chain.is_empty());
        assert_eq!(chain.dispatch(&envelope()).await.status_code(), 503);
    }

    #[tokio::test]
    async fn verified_without_handler_is_still_200() {
        let audit = Arc::new(InMemoryAuditLog::new());
        let chain = WebhookListenerChain::new().with_listener(
            "paypal",
            processor(FixedVerifier::new(true, VerificationOutcome::Verified), audit.clone()),
        );

        let decision = chain.dispatch(&envelope()).await;

        assert_eq!(decision.status_code(), 200);
        assert_eq!(decision.outcome().and_then(|o| o.handler.clone()), None);
        assert_eq!(audit.count_with_status(VerificationStatus::Verified).await, 1);
    }
}
