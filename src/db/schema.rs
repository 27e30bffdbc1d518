//! Static schema registry: which tables exist and what they can be queried by.
//!
//! This is the single source of truth for the store layout. Migration 1
//! turns it into tables and SQL indexes, and the store consults it to know
//! which index columns to fill on every write. It is `const` data and cannot
//! change while the process runs.
//!
//! ## Layout
//!
//! Each table stores the entity as a JSON document plus one column per
//! declared index:
//!
//! ```text
//! job_items
//! ┌──────┬──────────────┬───────────┬──────────┬─────────────────────────┬─────┐
//! │ id   │ body (JSON)  │ ix_job_id │ ix_state │ ix_state_urgency        │ ... │
//! ├──────┼──────────────┼───────────┼──────────┼─────────────────────────┼─────┤
//! │ 7f.. │ {"id":..}    │ "a1.."    │ "PENDING"│ ["PENDING","URGENT"]    │     │
//! └──────┴──────────────┴───────────┴──────────┴─────────────────────────┴─────┘
//! ```
//!
//! Composite indexes are one derived column holding the JSON array text of
//! the tuple. That representation supports exact tuple matches only, which
//! is all a composite index is allowed to answer.

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::libs::clock::format_timestamp;

/// Schema version written to backups and recorded by migrations.
pub const SCHEMA_VERSION: u32 = 1;

/// A secondary index over one field or an ordered tuple of fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

impl IndexDef {
    pub const fn single(field: &'static [&'static str; 1]) -> Self {
        IndexDef { name: field[0], fields: field }
    }

    pub const fn composite(name: &'static str, fields: &'static [&'static str]) -> Self {
        IndexDef { name, fields }
    }

    pub fn is_composite(&self) -> bool {
        self.fields.len() > 1
    }

    /// Column holding the index value, e.g. `ix_state_urgency`.
    pub fn column(&self) -> String {
        format!("ix_{}", self.fields.join("_"))
    }

    /// Extracts this index's value from an entity document.
    pub fn key_of(&self, body: &Value) -> IndexKey {
        if self.is_composite() {
            IndexKey::Tuple(self.fields.iter().map(|field| IndexKey::from_json(&body[*field])).collect())
        } else {
            IndexKey::from_json(&body[self.fields[0]])
        }
    }
}

/// Declaration of one entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub table: &'static str,
    pub primary_key: &'static str,
    pub indexes: &'static [IndexDef],
}

impl TableSchema {
    pub fn index(&self, name: &str) -> Option<&'static IndexDef> {
        self.indexes.iter().find(|index| index.name == name)
    }
}

pub const JOBS: TableSchema = TableSchema {
    table: "jobs",
    primary_key: "id",
    indexes: &[
        IndexDef::single(&["status"]),
        IndexDef::single(&["priority"]),
        IndexDef::single(&["archived_at"]),
        IndexDef::single(&["created_at"]),
        IndexDef::single(&["updated_at"]),
        IndexDef::single(&["sort_order"]),
    ],
};

pub const JOB_ITEMS: TableSchema = TableSchema {
    table: "job_items",
    primary_key: "id",
    indexes: &[
        IndexDef::single(&["job_id"]),
        IndexDef::single(&["state"]),
        IndexDef::single(&["urgency"]),
        IndexDef::composite("state+urgency", &["state", "urgency"]),
        IndexDef::single(&["reminder_at"]),
        IndexDef::single(&["created_at"]),
        IndexDef::single(&["updated_at"]),
        IndexDef::single(&["sort_order"]),
    ],
};

pub const INVENTORY_ITEMS: TableSchema = TableSchema {
    table: "inventory_items",
    primary_key: "id",
    indexes: &[
        IndexDef::single(&["name_key"]),
        IndexDef::single(&["level"]),
        IndexDef::single(&["updated_at"]),
        IndexDef::single(&["created_at"]),
    ],
};

pub const EVENT_LOGS: TableSchema = TableSchema {
    table: "event_logs",
    primary_key: "id",
    indexes: &[
        IndexDef::single(&["timestamp"]),
        IndexDef::single(&["entity_type"]),
        IndexDef::composite("entity_type+entity_id", &["entity_type", "entity_id"]),
    ],
};

/// Every table the store manages, in creation order.
pub const SCHEMA: &[TableSchema] = &[JOBS, JOB_ITEMS, INVENTORY_ITEMS, EVENT_LOGS];

pub fn table(name: &str) -> Option<&'static TableSchema> {
    SCHEMA.iter().find(|schema| schema.table == name)
}

/// A value as seen by an index.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexKey {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Tuple(Vec<IndexKey>),
}

impl IndexKey {
    /// Builds a composite key for an exact tuple match.
    pub fn tuple<I: IntoIterator<Item = IndexKey>>(parts: I) -> Self {
        IndexKey::Tuple(parts.into_iter().collect())
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => IndexKey::Null,
            Value::Bool(flag) => IndexKey::Integer(i64::from(*flag)),
            Value::Number(number) => match number.as_i64() {
                Some(int) => IndexKey::Integer(int),
                None => IndexKey::Real(number.as_f64().unwrap_or_default()),
            },
            Value::String(text) => IndexKey::Text(text.clone()),
            other => IndexKey::Text(other.to_string()),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            IndexKey::Null => Value::Null,
            IndexKey::Integer(int) => Value::from(*int),
            IndexKey::Real(real) => Value::from(*real),
            IndexKey::Text(text) => Value::from(text.as_str()),
            IndexKey::Tuple(parts) => Value::Array(parts.iter().map(IndexKey::to_json).collect()),
        }
    }

    /// The value bound to the index column.
    pub fn to_sql(&self) -> SqlValue {
        match self {
            IndexKey::Null => SqlValue::Null,
            IndexKey::Integer(int) => SqlValue::Integer(*int),
            IndexKey::Real(real) => SqlValue::Real(*real),
            IndexKey::Text(text) => SqlValue::Text(text.clone()),
            IndexKey::Tuple(_) => SqlValue::Text(self.to_json().to_string()),
        }
    }
}

impl From<&str> for IndexKey {
    fn from(value: &str) -> Self {
        IndexKey::Text(value.to_string())
    }
}

impl From<String> for IndexKey {
    fn from(value: String) -> Self {
        IndexKey::Text(value)
    }
}

impl From<i64> for IndexKey {
    fn from(value: i64) -> Self {
        IndexKey::Integer(value)
    }
}

impl From<DateTime<Utc>> for IndexKey {
    fn from(value: DateTime<Utc>) -> Self {
        IndexKey::Text(format_timestamp(&value))
    }
}

/// Which index values a query selects.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyRange {
    /// Every record that has a value for the index.
    All,
    Equals(IndexKey),
    AtMost(IndexKey),
    AtLeast(IndexKey),
    Between(IndexKey, IndexKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// An index lookup: results come back in index order, insertion order
/// within equal keys.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    pub index: &'static str,
    pub range: KeyRange,
    pub direction: Direction,
    pub limit: Option<usize>,
}

impl IndexQuery {
    pub fn new(index: &'static str, range: KeyRange) -> Self {
        IndexQuery {
            index,
            range,
            direction: Direction::Ascending,
            limit: None,
        }
    }

    pub fn equals(index: &'static str, key: impl Into<IndexKey>) -> Self {
        Self::new(index, KeyRange::Equals(key.into()))
    }

    pub fn at_most(index: &'static str, key: impl Into<IndexKey>) -> Self {
        Self::new(index, KeyRange::AtMost(key.into()))
    }

    pub fn all(index: &'static str) -> Self {
        Self::new(index, KeyRange::All)
    }

    pub fn reverse(mut self) -> Self {
        self.direction = Direction::Descending;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
