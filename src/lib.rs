//! # Fieldbook - local-first field-work tracker
//!
//! Keeps jobs, their checklist items, a deduplicated supply inventory and an
//! append-only audit trail in a single on-device SQLite database.
//!
//! ## Features
//!
//! - **Jobs**: Status, priority, site details, archive and duplicate
//! - **Job Items**: Notes, purchases and materials with urgency, reminders and manual order
//! - **Inventory**: Supplies deduplicated by a normalized name, merge, add to a shopping list
//! - **Today View**: Urgent and due items across all jobs
//! - **Audit Trail**: Every change recorded as an immutable event
//! - **Backups**: JSON export and transactional import
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fieldbook::commands::Cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     Cli::menu()
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
