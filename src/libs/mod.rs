//! Core library modules for fieldbook.
//!
//! Domain types, the ambient pieces every layer shares (errors, clock,
//! configuration, messages) and the presentation helpers used by the
//! command-line front end.
//!
//! ## Features
//!
//! - **Domain Model**: Jobs, job items, inventory items and audit records
//! - **Core Infrastructure**: Errors, clock, configuration, data storage, messaging
//! - **Dedup Keys**: Text normalization for inventory names
//! - **Backups**: Full JSON snapshots with transactional restore
//! - **User Interface**: Console tables
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fieldbook::db::{db::Db, inventory::Inventory};
//! use fieldbook::libs::inventory_item::{InventoryFilter, NewInventoryItem};
//!
//! let db = Db::new()?;
//! let inventory = Inventory::new(&db);
//! inventory.create(NewInventoryItem::named("Cinta americana"))?;
//! let supplies = inventory.list(&InventoryFilter::default())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod backup;
pub mod clock;
pub mod config;
pub mod data_storage;
pub mod error;
pub mod event_log;
pub mod inventory_item;
pub mod job;
pub mod job_item;
pub mod messages;
pub mod normalize;
pub mod view;
