//! Fire-and-forget audit trail.
//!
//! Requests push events onto a bounded channel and never wait on storage. A
//! background task drains the channel in batches: a batch is written once it
//! holds `max_size` events or `timeout` after its first event arrived,
//! whichever comes first.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::{sync::mpsc, task::JoinHandle, time::Instant};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    pub max_size: usize,
    pub timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_size: 25,
            timeout: Duration::from_secs(5),
        }
    }
}

#[async_trait]
pub trait AuditSink: Send + Sync + 'static {
    async fn write_batch(&self, events: Vec<AuditEvent>) -> anyhow::Result<()>;
}

/// Writes batches into `audit_logs` with one multi-row insert.
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn write_batch(&self, events: Vec<AuditEvent>) -> anyhow::Result<()> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO audit_logs (id, user_id, action, resource, metadata) ",
        );
        builder.push_values(events, |mut row, event| {
            row.push_bind(event.id)
                .push_bind(event.user_id)
                .push_bind(event.action)
                .push_bind(event.resource)
                .push_bind(event.metadata);
        });
        builder.build().execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct AuditLog {
    tx: Option<mpsc::Sender<AuditEvent>>,
}

impl AuditLog {
    pub fn spawn<S: AuditSink>(sink: S, config: BatchConfig) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = tokio::spawn(run_batcher(sink, rx, config));
        (Self { tx: Some(tx) }, handle)
    }

    /// Drops every event. Used where no database is wired in.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn record(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        resource: Option<&str>,
        metadata: Option<Value>,
    ) {
        let Some(tx) = &self.tx else {
            return;
        };
        let event = AuditEvent {
            id: Uuid::new_v4(),
            user_id,
            action: action.to_string(),
            resource: resource.map(str::to_string),
            metadata,
        };
        if let Err(err) = tx.try_send(event) {
            tracing::warn!(error = %err, action, "audit event dropped");
        }
    }
}

async fn run_batcher<S: AuditSink>(
    sink: S,
    mut rx: mpsc::Receiver<AuditEvent>,
    config: BatchConfig,
) {
    let max_size = config.max_size.max(1);
    while let Some(first) = rx.recv().await {
        let deadline = Instant::now() + config.timeout;
        let mut batch = Vec::with_capacity(max_size);
        batch.push(first);

        while batch.len() < max_size {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(event)) => batch.push(event),
                Ok(None) | Err(_) => break,
            }
        }

        let size = batch.len();
        match sink.write_batch(batch).await {
            Ok(()) => tracing::debug!(size, "audit batch written"),
            Err(err) => tracing::warn!(error = %err, size, "audit batch failed"),
        }
    }
}
