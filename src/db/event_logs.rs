//! Append-only audit trail.
//!
//! Every repository mutation ends with one or more calls to
//! [`EventLogs::record`]. Records are never updated or deleted; the only
//! write path is `add`, so an id collision is a hard error rather than an
//! overwrite.

use super::db::{Db, Entity};
use super::schema::{IndexKey, IndexQuery, TableSchema, EVENT_LOGS};
use crate::libs::error::{RepoError, RepoResult, StoreResult};
use crate::libs::event_log::{AuditAction, EntityType, EventFilter, EventLog};
use crate::libs::messages::Message;
use crate::msg_debug;
use serde_json::Value;
use uuid::Uuid;

impl Entity for EventLog {
    const SCHEMA: &'static TableSchema = &EVENT_LOGS;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct EventLogs {
    db: Db,
}

impl EventLogs {
    pub fn new(db: &Db) -> Self {
        EventLogs { db: db.clone() }
    }

    /// Writes a new audit record stamped with a fresh id and the current time.
    pub fn append(&self, entity_type: EntityType, entity_id: &str, action: AuditAction, meta: Value) -> StoreResult<EventLog> {
        let event = EventLog {
            id: Uuid::new_v4().to_string(),
            timestamp: self.db.now(),
            entity_type,
            entity_id: entity_id.to_string(),
            action: action.as_str().to_string(),
            meta: if meta.is_null() { Value::Object(Default::default()) } else { meta },
        };

        self.db.add(&event)?;
        msg_debug!(Message::AuditAppended(action.as_str().to_string(), entity_id.to_string()));
        Ok(event)
    }

    /// Second phase of a mutation: audit a change that is already committed.
    ///
    /// A failure here is reported as [`RepoError::AuditAppend`] so callers
    /// can tell it apart from a failure of the change itself.
    pub fn record(&self, entity_type: EntityType, entity_id: &str, action: AuditAction, meta: Value) -> RepoResult<EventLog> {
        self.append(entity_type, entity_id, action, meta).map_err(|source| RepoError::AuditAppend {
            action: action.as_str(),
            entity_id: entity_id.to_string(),
            source,
        })
    }

    /// Lists audit records, most recent first, capped at `filter.limit`.
    ///
    /// Type and id together use the composite index, type alone the
    /// `entity_type` index; anything else walks the `timestamp` index
    /// backwards (filtering by id when only an id is given).
    pub fn list(&self, filter: &EventFilter) -> StoreResult<Vec<EventLog>> {
        match (&filter.entity_type, &filter.entity_id) {
            (Some(entity_type), Some(entity_id)) => {
                let key = IndexKey::tuple([IndexKey::from(entity_type.as_str()), IndexKey::from(entity_id.as_str())]);
                self.db.query(&IndexQuery::equals("entity_type+entity_id", key).reverse().limit(filter.limit))
            }
            (Some(entity_type), None) => self.db.query(&IndexQuery::equals("entity_type", entity_type.as_str()).reverse().limit(filter.limit)),
            (None, Some(entity_id)) => {
                let events: Vec<EventLog> = self.db.query(&IndexQuery::all("timestamp").reverse())?;
                Ok(events.into_iter().filter(|event| &event.entity_id == entity_id).take(filter.limit).collect())
            }
            (None, None) => self.db.query(&IndexQuery::all("timestamp").reverse().limit(filter.limit)),
        }
    }
}
