//! Full snapshots of the store as a JSON file.
//!
//! A [`BackupFile`] carries every job, job item, inventory item and audit
//! record together with the schema version and the build that wrote it.
//!
//! ## Restore rules
//!
//! Restoring loads the snapshot into the store inside one transaction, so
//! it either applies completely or not at all. The same rules as live
//! writes are enforced on the way in:
//!
//! - the snapshot's schema version must equal [`SCHEMA_VERSION`]
//! - ids must not exist in the store yet
//! - inventory `name_key` is derived again from the name and must be unique
//! - DONE items get a `done_at`, other items lose it
//!
//! Audit records are loaded as they are and restoring writes no new ones.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fieldbook::db::db::Db;
//! use fieldbook::libs::backup::Backup;
//!
//! let source = Db::open("old.db")?;
//! Backup::export(&source)?.write_to("snapshot.json")?;
//!
//! let target = Db::open("new.db")?;
//! let report = Backup::restore(&target, &Backup::read_from("snapshot.json")?)?;
//! println!("{} jobs restored", report.jobs);
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::db::db::Db;
use crate::db::schema::{IndexQuery, EVENT_LOGS, INVENTORY_ITEMS, JOBS, JOB_ITEMS, SCHEMA_VERSION};
use crate::libs::clock::rfc3339;
use crate::libs::error::{RepoError, RepoResult, StoreResult};
use crate::libs::event_log::EventLog;
use crate::libs::inventory_item::InventoryItem;
use crate::libs::job::Job;
use crate::libs::job_item::JobItem;
use crate::libs::messages::Message;
use crate::libs::normalize::normalize_text;
use crate::msg_debug;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

include!(concat!(env!("OUT_DIR"), "/app_metadata.rs"));

/// The build that produced a backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupApp {
    pub name: String,
    pub build: String,
}

impl BackupApp {
    pub fn current() -> Self {
        BackupApp {
            name: APP_METADATA_NAME.to_string(),
            build: APP_METADATA_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupData {
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub job_items: Vec<JobItem>,
    #[serde(default)]
    pub inventory_items: Vec<InventoryItem>,
    #[serde(default)]
    pub event_logs: Vec<EventLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupFile {
    pub schema_version: u32,
    #[serde(with = "rfc3339")]
    pub exported_at: DateTime<Utc>,
    pub app: BackupApp,
    pub data: BackupData,
}

impl BackupFile {
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(&file, self)?;
        Ok(())
    }
}

/// Number of records loaded per table by a restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub jobs: usize,
    pub job_items: usize,
    pub inventory_items: usize,
    pub event_logs: usize,
}

pub struct Backup;

impl Backup {
    /// Reads the whole store in one transaction, so the snapshot is consistent.
    pub fn export(db: &Db) -> StoreResult<BackupFile> {
        let exported_at = db.now();
        let data = db.transaction(&[JOBS.table, JOB_ITEMS.table, INVENTORY_ITEMS.table, EVENT_LOGS.table], |tx| {
            Ok::<_, crate::libs::error::StoreError>(BackupData {
                jobs: tx.all()?,
                job_items: tx.all()?,
                inventory_items: tx.all()?,
                event_logs: tx.all()?,
            })
        })?;

        msg_debug!(Message::BackupExported(data.jobs.len(), data.event_logs.len()));
        Ok(BackupFile {
            schema_version: SCHEMA_VERSION,
            exported_at,
            app: BackupApp::current(),
            data,
        })
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<BackupFile> {
        let content = fs::read_to_string(path)?;
        let backup: BackupFile = serde_json::from_str(&content)?;
        Ok(backup)
    }

    /// Loads a snapshot into `db`. Nothing is written unless every record is accepted.
    pub fn restore(db: &Db, backup: &BackupFile) -> RepoResult<RestoreReport> {
        if backup.schema_version != SCHEMA_VERSION {
            return Err(RepoError::Validation(format!(
                "backup schema version {} does not match store schema version {}",
                backup.schema_version, SCHEMA_VERSION
            )));
        }

        let data = &backup.data;
        let report = db.transaction(&[JOBS.table, JOB_ITEMS.table, INVENTORY_ITEMS.table, EVENT_LOGS.table], |tx| {
            for job in &data.jobs {
                if tx.get::<Job>(&job.id)?.is_some() {
                    return Err(conflict("job", &job.id));
                }
                tx.add(job)?;
            }

            for item in &data.job_items {
                if tx.get::<JobItem>(&item.id)?.is_some() {
                    return Err(conflict("job item", &item.id));
                }
                let mut item = item.clone();
                // A DONE item without a timestamp is taken as done when last touched.
                item.apply_done_invariant(item.updated_at);
                tx.add(&item)?;
            }

            for item in &data.inventory_items {
                if tx.get::<InventoryItem>(&item.id)?.is_some() {
                    return Err(conflict("inventory item", &item.id));
                }
                let mut item = item.clone();
                item.name_key = normalize_text(&item.name);
                if item.name_key.is_empty() {
                    return Err(RepoError::Validation(format!("inventory item {} has an empty name", item.id)));
                }
                let holders: Vec<InventoryItem> = tx.query(&IndexQuery::equals("name_key", item.name_key.as_str()).limit(1))?;
                if let Some(holder) = holders.first() {
                    return Err(RepoError::Conflict(format!(
                        "inventory item '{}' collides with existing '{}'",
                        item.name, holder.name
                    )));
                }
                tx.add(&item)?;
            }

            for event in &data.event_logs {
                if tx.get::<EventLog>(&event.id)?.is_some() {
                    return Err(conflict("event log", &event.id));
                }
                tx.add(event)?;
            }

            Ok(RestoreReport {
                jobs: data.jobs.len(),
                job_items: data.job_items.len(),
                inventory_items: data.inventory_items.len(),
                event_logs: data.event_logs.len(),
            })
        })?;

        msg_debug!(Message::BackupRestored(report.jobs, report.event_logs));
        Ok(report)
    }
}

fn conflict(entity: &str, id: &str) -> RepoError {
    RepoError::Conflict(format!("{entity} {id} already exists"))
}
