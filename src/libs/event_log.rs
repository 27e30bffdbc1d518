use crate::libs::clock::rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Default cap on audit listings.
pub const DEFAULT_EVENT_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Job,
    JobItem,
    Inventory,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Job => "JOB",
            EntityType::JobItem => "JOB_ITEM",
            EntityType::Inventory => "INVENTORY",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verb recorded in an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    JobCreated,
    JobUpdated,
    JobStatusChanged,
    JobPriorityChanged,
    JobArchived,
    JobDuplicated,
    ItemCreated,
    ItemUpdated,
    ItemDone,
    ItemUndone,
    ItemSnoozed,
    ItemConverted,
    ItemReordered,
    ItemDeleted,
    InvCreated,
    InvUpdated,
    InvLevelChanged,
    InvMerged,
    InvAddedToPurchases,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::JobCreated => "JOB_CREATED",
            AuditAction::JobUpdated => "JOB_UPDATED",
            AuditAction::JobStatusChanged => "JOB_STATUS_CHANGED",
            AuditAction::JobPriorityChanged => "JOB_PRIORITY_CHANGED",
            AuditAction::JobArchived => "JOB_ARCHIVED",
            AuditAction::JobDuplicated => "JOB_DUPLICATED",
            AuditAction::ItemCreated => "ITEM_CREATED",
            AuditAction::ItemUpdated => "ITEM_UPDATED",
            AuditAction::ItemDone => "ITEM_DONE",
            AuditAction::ItemUndone => "ITEM_UNDONE",
            AuditAction::ItemSnoozed => "ITEM_SNOOZED",
            AuditAction::ItemConverted => "ITEM_CONVERTED",
            AuditAction::ItemReordered => "ITEM_REORDERED",
            AuditAction::ItemDeleted => "ITEM_DELETED",
            AuditAction::InvCreated => "INV_CREATED",
            AuditAction::InvUpdated => "INV_UPDATED",
            AuditAction::InvLevelChanged => "INV_LEVEL_CHANGED",
            AuditAction::InvMerged => "INV_MERGED",
            AuditAction::InvAddedToPurchases => "INV_ADDED_TO_PURCHASES",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub id: String,
    #[serde(with = "rfc3339")]
    pub timestamp: DateTime<Utc>,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub action: String,
    #[serde(default = "empty_meta")]
    pub meta: Value,
}

fn empty_meta() -> Value {
    Value::Object(Map::new())
}

/// Criteria for [`crate::db::event_logs::EventLogs::list`].
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub limit: usize,
}

impl Default for EventFilter {
    fn default() -> Self {
        EventFilter {
            entity_type: None,
            entity_id: None,
            limit: DEFAULT_EVENT_LIMIT,
        }
    }
}

impl EventFilter {
    pub fn for_entity(entity_type: EntityType, entity_id: &str) -> Self {
        EventFilter {
            entity_type: Some(entity_type),
            entity_id: Some(entity_id.to_string()),
            ..Default::default()
        }
    }

    pub fn for_type(entity_type: EntityType) -> Self {
        EventFilter {
            entity_type: Some(entity_type),
            ..Default::default()
        }
    }
}
