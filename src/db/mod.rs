//! Database layer for fieldbook.
//!
//! A local entity store on SQLite plus one repository per entity. The
//! repositories hold all the rules of the domain: validation, defaults,
//! dedup by normalized name, the DONE/done_at pairing and the audit trail.
//! Presentation code talks only to them.
//!
//! ## Features
//!
//! - **Entity Store**: JSON documents with declared secondary indexes, scoped transactions
//! - **Schema Registry**: Static table and index declarations applied by migrations
//! - **Audit Trail**: Append-only event log written after every mutation
//! - **Today View**: Read-only join of urgent and due items with their jobs
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fieldbook::db::{db::Db, jobs::Jobs, job_items::JobItems, today::{Today, TodayLimits}};
//! use fieldbook::libs::job::NewJob;
//! use fieldbook::libs::job_item::{JobItemType, NewJobItem};
//!
//! let db = Db::open_in_memory()?;
//! let job = Jobs::new(&db).create(NewJob::titled("Bathroom refit"))?;
//! JobItems::new(&db).create(&job.id, NewJobItem::new(JobItemType::Buy, "Silicone").urgent())?;
//!
//! let snapshot = Today::new(&db).snapshot(TodayLimits::default())?;
//! assert_eq!(snapshot.urgent.len(), 1);
//! # Ok::<(), fieldbook::libs::error::RepoError>(())
//! ```
//!
//! Every repository is built from the same [`db::Db`] handle, so they share
//! one connection and one clock.

/// Store handle, table operations and scoped transactions.
pub mod db;

/// Table and index declarations.
pub mod schema;

/// Versioned application of the schema registry.
pub mod migrations;

/// Append-only audit records.
pub mod event_logs;

/// Jobs: create, update, status and priority changes, archive, duplicate.
pub mod jobs;

/// Job items: checklist entries, reminders, reordering.
pub mod job_items;

/// Deduplicated supplies, merge and add-to-purchases.
pub mod inventory;

/// Urgent and due items for the current moment.
pub mod today;
