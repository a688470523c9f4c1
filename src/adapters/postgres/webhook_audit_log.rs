//! PostgreSQL implementation of WebhookAuditLog.
//!
//! Rows are only ever inserted.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::ports::{AuditLogError, AuditRecord, WebhookAuditLog};

/// PostgreSQL implementation of the WebhookAuditLog port.
pub struct PostgresWebhookAuditLog {
    pool: PgPool,
}

impl PostgresWebhookAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookAuditLog for PostgresWebhookAuditLog {
    async fn append(&self, record: AuditRecord) -> Result<(), AuditLogError> {
        sqlx::query(
            r#"
            INSERT INTO webhook_audit_log (
                id, webhook_id, event_type, user_agent, request_method,
                request_headers, body, verification_status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.webhook_id)
        .bind(&record.event_type)
        .bind(&record.user_agent)
        .bind(&record.request_method)
        .bind(&record.request_headers)
        .bind(&record.body)
        .bind(record.verification_status.as_str())
        .bind(record.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| AuditLogError::Storage(format!("Failed to insert audit record: {}", e)))?;

        Ok(())
    }
}
