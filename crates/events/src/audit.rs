//! Audit trail abstraction (mechanics only).
//!
//! Every successful manufacturing save appends exactly one [`AuditEntry`]
//! describing what changed. Failed attempts never reach the log.
//!
//! The log is a side channel: entries are appended **after** the save has been
//! committed, so a sink failure cannot undo a save. Callers decide whether a
//! failed append is fatal (the manufacturing service logs and moves on).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// What happened to the audited entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
        }
    }
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record: `(action, entity_type, entity_id, before, after)`.
///
/// `before` is `None` for creations. Snapshots are plain JSON so the log does not
/// depend on the domain crates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    entry_id: Uuid,
    action: AuditAction,
    entity_type: String,
    entity_id: String,
    before: Option<JsonValue>,
    after: Option<JsonValue>,
    occurred_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        action: AuditAction,
        entity_type: impl Into<String>,
        entity_id: impl ToString,
        before: Option<JsonValue>,
        after: Option<JsonValue>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entry_id: Uuid::now_v7(),
            action,
            entity_type: entity_type.into(),
            entity_id: entity_id.to_string(),
            before,
            after,
            occurred_at,
        }
    }

    pub fn entry_id(&self) -> Uuid {
        self.entry_id
    }

    pub fn action(&self) -> AuditAction {
        self.action
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn before(&self) -> Option<&JsonValue> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&JsonValue> {
        self.after.as_ref()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Append-only audit sink.
///
/// Implementations must be safe to share across threads; concurrent saves append
/// concurrently.
pub trait AuditLog: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn record(&self, entry: AuditEntry) -> Result<(), Self::Error>;
}

impl<L> AuditLog for Arc<L>
where
    L: AuditLog + ?Sized,
{
    type Error = L::Error;

    fn record(&self, entry: AuditEntry) -> Result<(), Self::Error> {
        (**self).record(entry)
    }
}
