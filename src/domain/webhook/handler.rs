//! Handler capability contract and the explicit handler registry.
//!
//! Handlers are looked up by the normalized event name:
//! `PAYMENT.CAPTURE.COMPLETED` resolves to the handler named `PaymentCaptureCompleted`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::envelope::EventEnvelope;
use super::errors::WebhookError;

/// Side effect for one family of verified events.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    /// Registry key, in normalized form (e.g. `PaymentCaptureCompleted`).
    fn name(&self) -> &str;

    /// Exact event types this handler accepts.
    fn supported_event_types(&self) -> &[&'static str];

    /// Case-sensitive membership test.
    fn supports(&self, event_type: &str) -> bool {
        self.supported_event_types().contains(&event_type)
    }

    /// Runs the side effect. Only called for verified deliveries.
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), WebhookError>;
}

/// Normalizes an event type into a handler name.
///
/// Splits on space, dot, hyphen, and underscore, title-cases each word
/// (first character upper, rest lower), and joins without separators.
pub fn handler_name(event_type: &str) -> String {
    event_type
        .split(|c: char| matches!(c, ' ' | '.' | '-' | '_'))
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Handlers keyed by normalized name. Built once at startup.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn WebhookEventHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler. A later handler with the same name replaces the earlier one.
    pub fn register(&mut self, handler: Arc<dyn WebhookEventHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    pub fn with_handler(mut self, handler: Arc<dyn WebhookEventHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Finds the handler for an event type.
    ///
    /// Both errors are expected outcomes for event types nobody subscribed to.
    pub fn resolve(&self, event_type: &str) -> Result<Arc<dyn WebhookEventHandler>, WebhookError> {
        let name = handler_name(event_type);
        let handler = self
            .handlers
            .get(&name)
            .ok_or_else(|| WebhookError::HandlerNotFound(name.clone()))?;

        if !handler.supports(event_type) {
            return Err(WebhookError::HandlerUnsupported {
                handler: name,
                event_type: event_type.to_string(),
            });
        }

        Ok(Arc::clone(handler))
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}
