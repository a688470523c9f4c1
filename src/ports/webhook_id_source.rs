//! WebhookIdSource port - The webhook id the provider signs deliveries with.

use async_trait::async_trait;

/// Port for looking up the configured webhook id.
///
/// `None` means no id is configured, which leaves every delivery unverifiable.
#[async_trait]
pub trait WebhookIdSource: Send + Sync {
    async fn webhook_id(&self) -> Option<String>;
}
