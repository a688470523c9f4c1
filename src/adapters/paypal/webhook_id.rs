//! Webhook id taken from configuration.

use async_trait::async_trait;

use crate::ports::WebhookIdSource;

/// Serves the webhook id configured at startup.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredWebhookId {
    webhook_id: Option<String>,
}

impl ConfiguredWebhookId {
    pub fn new(webhook_id: Option<String>) -> Self {
        Self {
            webhook_id: webhook_id.filter(|id| !id.trim().is_empty()),
        }
    }
}

#[async_trait]
impl WebhookIdSource for ConfiguredWebhookId {
    async fn webhook_id(&self) -> Option<String> {
        self.webhook_id.clone()
    }
}
