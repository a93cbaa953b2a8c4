//! Audit Sinks

use sqlx::PgPool;

use crate::domain::entity::audit::{AuditEvent, AuditSink};

/// Writes audit events to the `audit` tracing target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            target: "audit",
            kind = %event.kind,
            actor = %event.actor,
            outcome = %event.outcome,
            source = ?event.source,
            action = %event.action,
            metadata = %event.metadata,
            "Audit event"
        );
    }
}

/// Persists audit events in `audit_events`
///
/// Inserts run on a spawned task; a failed insert is logged and dropped.
/// Must be used inside a Tokio runtime.
#[derive(Clone)]
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AuditSink for PgAuditSink {
    fn record(&self, event: AuditEvent) {
        let pool = self.pool.clone();

        tokio::spawn(async move {
            let result = sqlx::query(
                r#"
                INSERT INTO audit_events (
                    kind,
                    actor,
                    outcome,
                    source_ip,
                    action,
                    metadata,
                    created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(event.kind.to_string())
            .bind(&event.actor)
            .bind(event.outcome.to_string())
            .bind(event.source.map(|ip| ip.to_string()))
            .bind(&event.action)
            .bind(&event.metadata)
            .bind(event.at)
            .execute(&pool)
            .await;

            if let Err(e) = result {
                tracing::warn!(error = %e, action = %event.action, "Failed to persist audit event");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_sink_accepts_events() {
        let sink = TracingAuditSink;
        sink.record(AuditEvent::auth_attempt(
            "someone@example.com",
            crate::domain::entity::audit::AuditOutcome::Failure,
            None,
        ));
    }
}
