//! Typed change notifications emitted after every successful mutation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of record that was mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Epic,
    Task,
}

impl EntityKind {
    fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Epic => "epic",
            EntityKind::Task => "task",
        }
    }
}

/// The change performed.
///
/// `BulkUpdated` is the coarse resync signal for bulk ingestion: one event
/// per batch regardless of batch size, clients refetch instead of
/// receiving per-task payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
    BulkUpdated,
}

/// A change notification, fanned out to every connected client.
///
/// Payload carries the full post-mutation record for created/updated, the
/// bare `{"id"}` for deleted, and nothing for bulk updates. Must be
/// `Clone` for `tokio::sync::broadcast`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEvent {
    pub entity: EntityKind,
    pub action: ChangeAction,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
    /// ISO 8601 emission timestamp.
    pub timestamp: String,
}

impl BoardEvent {
    fn new(entity: EntityKind, action: ChangeAction, payload: serde_json::Value) -> Self {
        Self {
            entity,
            action,
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Notification for a freshly persisted record (full record payload).
    pub fn created(entity: EntityKind, payload: serde_json::Value) -> Self {
        Self::new(entity, ChangeAction::Created, payload)
    }

    /// Notification for an updated record (full post-update payload).
    pub fn updated(entity: EntityKind, payload: serde_json::Value) -> Self {
        Self::new(entity, ChangeAction::Updated, payload)
    }

    /// Notification for a removed record. Carries only the id.
    pub fn deleted(entity: EntityKind, id: Uuid) -> Self {
        Self::new(entity, ChangeAction::Deleted, serde_json::json!({ "id": id }))
    }

    /// Coarse "re-fetch your tasks" signal after a bulk batch.
    pub fn tasks_bulk_updated() -> Self {
        Self::new(
            EntityKind::Task,
            ChangeAction::BulkUpdated,
            serde_json::Value::Null,
        )
    }

    /// Logical channel name, e.g. `task:created` or `tasks_bulk_updated`.
    pub fn channel(&self) -> String {
        match self.action {
            ChangeAction::Created => format!("{}:created", self.entity.as_str()),
            ChangeAction::Updated => format!("{}:updated", self.entity.as_str()),
            ChangeAction::Deleted => format!("{}:deleted", self.entity.as_str()),
            ChangeAction::BulkUpdated => format!("{}s_bulk_updated", self.entity.as_str()),
        }
    }

    /// Id carried by a `deleted` payload, if present and well-formed.
    pub fn deleted_id(&self) -> Option<Uuid> {
        self.payload
            .get("id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}

/// Sink for change notifications.
///
/// Injected into the mutation service at construction — never reached
/// through ambient/global scope. Emitting is synchronous fire-and-forget:
/// it must never block or fail the mutation that triggered it.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: BoardEvent);
}

/// Emitter that drops every event. For tests and tooling that do not care
/// about notifications.
pub struct NullEmitter;

impl EventEmitter for NullEmitter {
    fn emit(&self, _event: BoardEvent) {}
}
