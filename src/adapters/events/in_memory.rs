//! In-memory payment event sink for testing.
//!
//! Captures published events for assertions.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{PaymentEvent, PaymentEventSink};

/// Collects every published payment event.
///
/// # Example
///
/// ```ignore
/// let sink = Arc::new(InMemoryPaymentEventSink::new());
/// let registry = default_registry(sink.clone());
///
/// // ... process a verified delivery
///
/// assert_eq!(sink.event_count().await, 1);
/// assert!(sink.has_event("PAYMENT.CAPTURE.COMPLETED").await);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentEventSink {
    published: Arc<RwLock<Vec<PaymentEvent>>>,
}

impl InMemoryPaymentEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    pub async fn published_events(&self) -> Vec<PaymentEvent> {
        self.published.read().await.clone()
    }

    pub async fn event_count(&self) -> usize {
        self.published.read().await.len()
    }

    pub async fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .await
            .iter()
            .any(|e| e.event_type == event_type)
    }
}

#[async_trait]
impl PaymentEventSink for InMemoryPaymentEventSink {
    async fn publish(&self, event: PaymentEvent) -> Result<(), DomainError> {
        self.published.write().await.push(event);
        Ok(())
    }
}
