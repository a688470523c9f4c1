//! In-Memory Webhook Audit Log Adapter
//!
//! Keeps audit records in memory. Useful for testing and development.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::webhook::VerificationStatus;
use crate::ports::{AuditLogError, AuditRecord, WebhookAuditLog};

/// In-memory append-only audit log
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in insertion order
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn count_with_status(&self, status: VerificationStatus) -> usize {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.verification_status == status)
            .count()
    }

    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl WebhookAuditLog for InMemoryAuditLog {
    async fn append(&self, record: AuditRecord) -> Result<(), AuditLogError> {
        self.records.write().await.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::webhook::{EventEnvelope, RequestHeaders};

    fn record(status: VerificationStatus) -> AuditRecord {
        let envelope = EventEnvelope::new("POST", RequestHeaders::new(), "{}", "");
        AuditRecord::from_envelope(&envelope, status)
    }

    #[tokio::test]
    async fn keeps_duplicates_in_order() {
        let log = InMemoryAuditLog::new();

        log.append(record(VerificationStatus::Skipped)).await.unwrap();
        log.append(record(VerificationStatus::Verified)).await.unwrap();
        log.append(record(VerificationStatus::Verified)).await.unwrap();

        let statuses: Vec<_> = log
            .records()
            .await
            .into_iter()
            .map(|r| r.verification_status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                VerificationStatus::Skipped,
                VerificationStatus::Verified,
                VerificationStatus::Verified
            ]
        );
        assert_eq!(log.count_with_status(VerificationStatus::Verified).await, 2);
    }

    #[tokio::test]
    async fn clones_share_records() {
        let log = InMemoryAuditLog::new();
        let handle = log.clone();

        handle.append(record(VerificationStatus::Ignored)).await.unwrap();
        assert_eq!(log.count().await, 1);

        log.clear().await;
        assert_eq!(handle.count().await, 0);
    }
}
