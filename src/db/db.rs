//! Entity store: durable tables over SQLite with declared secondary indexes.
//!
//! [`Db`] is the one handle every repository receives at construction. It
//! wraps a single connection behind a mutex, so all work runs through one
//! writer, and carries the shared [`Clock`].
//!
//! Reads and writes go through the same small set of table operations,
//! either directly on the handle (each call is its own implicit
//! transaction) or inside [`Db::transaction`], where every write is
//! committed together or not at all.
//!
//! ```rust,no_run
//! use fieldbook::db::db::Db;
//! use fieldbook::db::schema::{IndexQuery, JOB_ITEMS};
//! use fieldbook::libs::job_item::JobItem;
//!
//! let db = Db::open_in_memory()?;
//! let items: Vec<JobItem> = db.query(&IndexQuery::equals("job_id", "a1"))?;
//! db.transaction(&[JOB_ITEMS.table], |tx| {
//!     for item in &items {
//!         tx.delete::<JobItem>(&item.id)?;
//!     }
//!     Ok::<_, fieldbook::libs::error::StoreError>(())
//! })?;
//! # Ok::<(), fieldbook::libs::error::StoreError>(())
//! ```

use crate::db::migrations::init_with_migrations;
use crate::db::schema::{Direction, IndexQuery, KeyRange, TableSchema};
use crate::libs::clock::{Clock, SystemClock};
use crate::libs::config::Config;
use crate::libs::data_storage::DataStorage;
use crate::libs::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DB_FILE_NAME: &str = "fieldbook.db";

/// A record type stored in one registry table.
pub trait Entity: Serialize + DeserializeOwned {
    const SCHEMA: &'static TableSchema;

    fn id(&self) -> &str;
}

/// Shared store handle. Cloning is cheap and yields the same store.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
}

impl Db {
    /// Opens the database at the configured location (or the default data
    /// directory), applying pending migrations.
    pub fn new() -> anyhow::Result<Db> {
        Ok(Db::open(Self::resolve_path()?)?)
    }

    /// Database file from `database.path` in the config, or `fieldbook.db`
    /// in the data directory.
    pub fn resolve_path() -> anyhow::Result<PathBuf> {
        let config = Config::read()?;
        match config.database.and_then(|database| database.path) {
            Some(path) => Ok(path),
            None => DataStorage::new().get_path(DB_FILE_NAME),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> StoreResult<Db> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Db> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Opens a connection without running migrations.
    pub fn new_without_migrations(path: impl AsRef<Path>) -> StoreResult<Connection> {
        Ok(Connection::open(path)?)
    }

    fn from_connection(mut conn: Connection) -> StoreResult<Db> {
        init_with_migrations(&mut conn)?;
        Ok(Db {
            conn: Arc::new(Mutex::new(conn)),
            clock: Arc::new(SystemClock::new()),
        })
    }

    /// Replaces the time source shared by everything built on this handle.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Runs `f` against the underlying connection, e.g. to inspect migrations.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        f(&self.conn.lock())
    }

    pub fn get<E: Entity>(&self, id: &str) -> StoreResult<Option<E>> {
        get_in(&self.conn.lock(), id)
    }

    /// Inserts a new record; fails with `DuplicateKey` if the id exists.
    pub fn add<E: Entity>(&self, entity: &E) -> StoreResult<()> {
        add_in(&self.conn.lock(), entity)
    }

    /// Inserts or replaces a record.
    pub fn put<E: Entity>(&self, entity: &E) -> StoreResult<()> {
        put_in(&self.conn.lock(), entity)
    }

    /// Removes a record. Returns whether anything was deleted.
    pub fn delete<E: Entity>(&self, id: &str) -> StoreResult<bool> {
        delete_in::<E>(&self.conn.lock(), id)
    }

    pub fn query<E: Entity>(&self, query: &IndexQuery) -> StoreResult<Vec<E>> {
        query_in(&self.conn.lock(), query)
    }

    pub fn bulk_get<E: Entity>(&self, ids: &[String]) -> StoreResult<HashMap<String, E>> {
        bulk_get_in(&self.conn.lock(), ids)
    }

    /// Records whose id starts with `prefix`, at most `limit` of them.
    pub fn find_by_id_prefix<E: Entity>(&self, prefix: &str, limit: usize) -> StoreResult<Vec<E>> {
        let sql = format!("SELECT body FROM {} WHERE substr(id, 1, ?1) = ?2 ORDER BY rowid LIMIT ?3", E::SCHEMA.table);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![prefix.len() as i64, prefix, limit as i64], |row| row.get::<_, String>(0))?;
        collect_bodies(rows)
    }

    /// Every record of the table in insertion order.
    pub fn all<E: Entity>(&self) -> StoreResult<Vec<E>> {
        all_in(&self.conn.lock())
    }

    pub fn count<E: Entity>(&self) -> StoreResult<usize> {
        count_in::<E>(&self.conn.lock())
    }

    /// Runs `work` with the given tables in scope, committing every write
    /// atomically on `Ok` and rolling everything back on `Err`.
    ///
    /// The handle stays locked for the duration, so `work` must use the
    /// [`Tx`] it is given and never call back into this `Db`.
    pub fn transaction<T, E, F>(&self, tables: &[&'static str], work: F) -> Result<T, E>
    where
        F: FnOnce(&Tx<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        for name in tables {
            if crate::db::schema::table(name).is_none() {
                return Err(StoreError::UnknownTable(name.to_string()).into());
            }
        }

        let mut conn = self.conn.lock();
        let transaction = conn.transaction().map_err(StoreError::from)?;
        let tx = Tx {
            conn: &transaction,
            tables,
        };
        let result = work(&tx)?;
        transaction.commit().map_err(StoreError::from)?;
        Ok(result)
    }
}

/// Table access inside [`Db::transaction`]. Reads see the transaction's
/// own uncommitted writes; writes are limited to the declared tables.
pub struct Tx<'a> {
    conn: &'a Connection,
    tables: &'a [&'static str],
}

impl Tx<'_> {
    fn ensure_scope(&self, schema: &'static TableSchema) -> StoreResult<()> {
        if self.tables.contains(&schema.table) {
            Ok(())
        } else {
            Err(StoreError::TableNotInScope { table: schema.table })
        }
    }

    pub fn get<E: Entity>(&self, id: &str) -> StoreResult<Option<E>> {
        self.ensure_scope(E::SCHEMA)?;
        get_in(self.conn, id)
    }

    pub fn add<E: Entity>(&self, entity: &E) -> StoreResult<()> {
        self.ensure_scope(E::SCHEMA)?;
        add_in(self.conn, entity)
    }

    pub fn put<E: Entity>(&self, entity: &E) -> StoreResult<()> {
        self.ensure_scope(E::SCHEMA)?;
        put_in(self.conn, entity)
    }

    pub fn delete<E: Entity>(&self, id: &str) -> StoreResult<bool> {
        self.ensure_scope(E::SCHEMA)?;
        delete_in::<E>(self.conn, id)
    }

    pub fn query<E: Entity>(&self, query: &IndexQuery) -> StoreResult<Vec<E>> {
        self.ensure_scope(E::SCHEMA)?;
        query_in(self.conn, query)
    }

    pub fn bulk_get<E: Entity>(&self, ids: &[String]) -> StoreResult<HashMap<String, E>> {
        self.ensure_scope(E::SCHEMA)?;
        bulk_get_in(self.conn, ids)
    }

    pub fn all<E: Entity>(&self) -> StoreResult<Vec<E>> {
        self.ensure_scope(E::SCHEMA)?;
        all_in(self.conn)
    }
}

fn decode<E: Entity>(body: &str) -> StoreResult<E> {
    Ok(serde_json::from_str(body)?)
}

fn collect_bodies<E: Entity>(rows: impl Iterator<Item = rusqlite::Result<String>>) -> StoreResult<Vec<E>> {
    let mut entities = Vec::new();
    for body in rows {
        entities.push(decode(&body?)?);
    }
    Ok(entities)
}

fn get_in<E: Entity>(conn: &Connection, id: &str) -> StoreResult<Option<E>> {
    let sql = format!("SELECT body FROM {} WHERE id = ?1", E::SCHEMA.table);
    let body: Option<String> = conn.query_row(&sql, params![id], |row| row.get(0)).optional()?;
    body.map(|body| decode(&body)).transpose()
}

fn exists_in(conn: &Connection, schema: &TableSchema, id: &str) -> StoreResult<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", schema.table);
    Ok(conn.query_row(&sql, params![id], |_| Ok(())).optional()?.is_some())
}

/// Serializes the entity and derives its id and index column values.
fn row_values<E: Entity>(entity: &E) -> StoreResult<Vec<SqlValue>> {
    let schema = E::SCHEMA;
    let body = serde_json::to_value(entity)?;
    if body.get(schema.primary_key).and_then(|id| id.as_str()) != Some(entity.id()) {
        return Err(StoreError::MissingPrimaryKey {
            table: schema.table,
            field: schema.primary_key,
        });
    }

    let mut values = Vec::with_capacity(schema.indexes.len() + 2);
    values.push(SqlValue::Text(entity.id().to_string()));
    values.push(SqlValue::Text(body.to_string()));
    for index in schema.indexes {
        values.push(index.key_of(&body).to_sql());
    }
    Ok(values)
}

fn column_list(schema: &TableSchema) -> Vec<String> {
    let mut columns = vec!["id".to_string(), "body".to_string()];
    columns.extend(schema.indexes.iter().map(|index| index.column()));
    columns
}

fn add_in<E: Entity>(conn: &Connection, entity: &E) -> StoreResult<()> {
    let schema = E::SCHEMA;
    if exists_in(conn, schema, entity.id())? {
        return Err(StoreError::DuplicateKey {
            table: schema.table,
            id: entity.id().to_string(),
        });
    }

    let columns = column_list(schema);
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!("INSERT INTO {} ({}) VALUES ({})", schema.table, columns.join(", "), placeholders);
    conn.execute(&sql, params_from_iter(row_values(entity)?))?;
    Ok(())
}

fn put_in<E: Entity>(conn: &Connection, entity: &E) -> StoreResult<()> {
    let schema = E::SCHEMA;
    let columns = column_list(schema);
    let placeholders = vec!["?"; columns.len()].join(", ");
    // Upsert in place so the row keeps its rowid (insertion order).
    let assignments = columns
        .iter()
        .skip(1)
        .map(|column| format!("{column} = excluded.{column}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(id) DO UPDATE SET {}",
        schema.table,
        columns.join(", "),
        placeholders,
        assignments
    );
    conn.execute(&sql, params_from_iter(row_values(entity)?))?;
    Ok(())
}

fn delete_in<E: Entity>(conn: &Connection, id: &str) -> StoreResult<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", E::SCHEMA.table);
    Ok(conn.execute(&sql, params![id])? > 0)
}

fn query_in<E: Entity>(conn: &Connection, query: &IndexQuery) -> StoreResult<Vec<E>> {
    let schema = E::SCHEMA;
    let index = schema.index(query.index).ok_or_else(|| StoreError::UnknownIndex {
        table: schema.table,
        index: query.index.to_string(),
    })?;
    if index.is_composite() && !matches!(query.range, KeyRange::Equals(_)) {
        return Err(StoreError::CompositeRange {
            table: schema.table,
            index: index.name,
        });
    }

    let column = index.column();
    let (condition, mut bound) = match &query.range {
        KeyRange::All => (format!("{column} IS NOT NULL"), vec![]),
        KeyRange::Equals(key) => (format!("{column} = ?"), vec![key.to_sql()]),
        KeyRange::AtMost(key) => (format!("{column} <= ?"), vec![key.to_sql()]),
        KeyRange::AtLeast(key) => (format!("{column} >= ?"), vec![key.to_sql()]),
        KeyRange::Between(lower, upper) => (format!("{column} BETWEEN ? AND ?"), vec![lower.to_sql(), upper.to_sql()]),
    };
    let order = match query.direction {
        Direction::Ascending => "ASC",
        Direction::Descending => "DESC",
    };
    // LIMIT -1 means unbounded in SQLite.
    let limit = query.limit.map(|limit| limit as i64).unwrap_or(-1);
    bound.push(SqlValue::Integer(limit));

    let sql = format!(
        "SELECT body FROM {} WHERE {} ORDER BY {} {}, rowid {} LIMIT ?",
        schema.table, condition, column, order, order
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(bound), |row| row.get::<_, String>(0))?;
    collect_bodies(rows)
}

fn bulk_get_in<E: Entity>(conn: &Connection, ids: &[String]) -> StoreResult<HashMap<String, E>> {
    let mut found = HashMap::new();
    if ids.is_empty() {
        return Ok(found);
    }

    let sql = format!(
        "SELECT body FROM {} WHERE id IN ({})",
        E::SCHEMA.table,
        vec!["?"; ids.len()].join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(ids.iter()), |row| row.get::<_, String>(0))?;
    for entity in collect_bodies::<E>(rows)? {
        found.insert(entity.id().to_string(), entity);
    }
    Ok(found)
}

fn all_in<E: Entity>(conn: &Connection) -> StoreResult<Vec<E>> {
    let sql = format!("SELECT body FROM {} ORDER BY rowid", E::SCHEMA.table);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    collect_bodies(rows)
}

fn count_in<E: Entity>(conn: &Connection) -> StoreResult<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", E::SCHEMA.table);
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count as usize)
}
