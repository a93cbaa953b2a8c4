//! Audit Events
//!
//! Security-relevant facts (login attempts, administrative changes) handed to
//! an [`AuditSink`]. Events never carry passwords, hashes or tokens.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    #[display("auth_attempt")]
    AuthAttempt,
    #[display("admin_action")]
    AdminAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    #[display("success")]
    Success,
    #[display("failure")]
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub kind: AuditKind,
    /// Identity id, or the normalized email for failed logins
    pub actor: String,
    pub outcome: AuditOutcome,
    pub source: Option<IpAddr>,
    /// Short verb such as `sign_in` or `change_role`
    pub action: String,
    pub metadata: serde_json::Value,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn auth_attempt(
        actor: impl Into<String>,
        outcome: AuditOutcome,
        source: Option<IpAddr>,
    ) -> Self {
        Self {
            kind: AuditKind::AuthAttempt,
            actor: actor.into(),
            outcome,
            source,
            action: "sign_in".to_string(),
            metadata: serde_json::Value::Null,
            at: Utc::now(),
        }
    }

    pub fn admin_action(
        actor: impl Into<String>,
        action: impl Into<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            kind: AuditKind::AdminAction,
            actor: actor.into(),
            outcome: AuditOutcome::Success,
            source: None,
            action: action.into(),
            metadata,
            at: Utc::now(),
        }
    }

    pub fn with_outcome(mut self, outcome: AuditOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn with_source(mut self, source: Option<IpAddr>) -> Self {
        self.source = source;
        self
    }
}

/// Destination for audit events
///
/// `record` is synchronous and must not block; sinks that do I/O spawn it.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}
