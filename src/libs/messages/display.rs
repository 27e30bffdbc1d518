//! Wording of every [`Message`].
//!
//! All text shown to users or written to the debug log is defined here, in
//! one match, so that a new variant cannot be added without deciding how
//! it reads.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === JOB MESSAGES ===
            Message::JobCreated(title) => format!("Job '{}' created", title),
            Message::JobUpdated(job) => format!("Job '{}' updated", job),
            Message::JobStatusChanged(title, status) => format!("Job '{}' is now {}", title, status),
            Message::JobPriorityChanged(title, priority) => format!("Job '{}' priority set to {}", title, priority),
            Message::JobArchived(title) => format!("Job '{}' archived", title),
            Message::JobDuplicated(source, copy) => format!("Job '{}' duplicated as '{}'", source, copy),
            Message::JobListHeader => "Jobs:".to_string(),
            Message::NoJobsFound => "No jobs found".to_string(),

            // === JOB ITEM MESSAGES ===
            Message::ItemCreated(title) => format!("Item '{}' added", title),
            Message::ItemUpdated(item) => format!("Item '{}' updated", item),
            Message::ItemDone(title) => format!("Item '{}' done", title),
            Message::ItemUndone(title) => format!("Item '{}' is pending again", title),
            Message::ItemSnoozed(title, at) => format!("Item '{}' will remind you at {}", title, at),
            Message::ItemReminderCleared(title) => format!("Reminder removed from '{}'", title),
            Message::ItemConverted(title) => format!("Item '{}' moved to the shopping list", title),
            Message::ItemsReordered(job, count) => format!("{} items of '{}' reordered", count, job),
            Message::ItemDeleted(item) => format!("Item '{}' deleted", item),
            Message::JobItemsHeader(title) => format!("Items of '{}':", title),
            Message::NoItemsForJob(title) => format!("Job '{}' has no items", title),
            Message::InvalidReminder(input) => {
                format!("Cannot read '{}' as a reminder time (use RFC 3339, YYYY-MM-DD HH:MM or +30m / +4h / +2d)", input)
            }

            // === INVENTORY MESSAGES ===
            Message::InventoryCreated(name) => format!("Supply '{}' added", name),
            Message::InventoryUpdated(item) => format!("Supply '{}' updated", item),
            Message::InventoryRenamed(old, new) => format!("Supply '{}' renamed to '{}'", old, new),
            Message::InventoryLevelChanged(name, level) => format!("Supply '{}' is now {}", name, level),
            Message::InventoryMerged(source, target) => format!("'{}' merged into '{}'", source, target),
            Message::InventoryAddedToPurchases(name, job) => format!("'{}' added to the shopping list of '{}'", name, job),
            Message::InventoryListHeader => "Inventory:".to_string(),
            Message::NoInventoryFound => "No supplies found".to_string(),
            Message::ConfirmMerge(source, target) => format!("Merge '{}' into '{}' and delete '{}'?", source, target, source),

            // === TODAY MESSAGES ===
            Message::TodayHeader(now) => format!("Today, {}", now),
            Message::TodayUrgentHeader(count) => format!("Urgent ({}):", count),
            Message::TodayDueHeader(count) => format!("Due ({}):", count),
            Message::TodayNothing => "Nothing urgent or due".to_string(),

            // === AUDIT LOG MESSAGES ===
            Message::AuditAppended(action, entity_id) => format!("Audit {} for {}", action, entity_id),
            Message::EventLogHeader(count) => format!("Last {} audit records:", count),
            Message::NoEventsFound => "No audit records found".to_string(),

            // === BACKUP MESSAGES ===
            Message::BackupExported(jobs, events) => format!("Exported {} jobs and {} audit records", jobs, events),
            Message::BackupWritten(path, jobs, events) => {
                format!("Backup written to {} ({} jobs, {} audit records)", path, jobs, events)
            }
            Message::BackupRestored(jobs, events) => format!("Restored {} jobs and {} audit records", jobs, events),
            Message::BackupImported(jobs, items, supplies, events) => format!(
                "Imported {} jobs, {} items, {} supplies and {} audit records",
                jobs, items, supplies, events
            ),
            Message::ConfirmImport(path, build) => format!("Import backup {} written by version {}?", path, build),

            // === LOOKUP MESSAGES ===
            Message::RecordNotFound(table, id) => format!("Nothing in {} matches '{}'", table, id),
            Message::AmbiguousId(id) => format!("'{}' matches more than one record, use a longer id", id),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved".to_string(),
            Message::ConfigDeleted => "Configuration removed".to_string(),
            Message::ConfigFileNotFound => "No configuration file found".to_string(),
            Message::ConfigModuleDatabase => "Database".to_string(),
            Message::ConfigModuleToday => "Today view".to_string(),
            Message::ConfigModuleEvents => "Audit log".to_string(),
            Message::PromptDatabasePath => "Database file (empty for the default location)".to_string(),
            Message::PromptLimitUrgent => "Maximum urgent items".to_string(),
            Message::PromptLimitDue => "Maximum due items".to_string(),
            Message::PromptEventLimit => "Audit records to list by default".to_string(),

            // === GENERAL MESSAGES ===
            Message::OperationCancelled => "Operation cancelled".to_string(),
            Message::NoChangesDetected => "No changes given".to_string(),

            // === MIGRATION MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending database migrations", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("Migration v{} completed", version),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All database migrations completed".to_string(),
            Message::DatabaseVersion(version) => format!("Current database version: {}", version),
            Message::DatabaseUpToDate => "Database schema is up to date".to_string(),
            Message::DatabaseNeedsUpdate => "Database schema needs to be updated".to_string(),
            Message::MigrationHistory => "Migration history:".to_string(),
            Message::MigrationHistoryEntry(version, name, applied_at) => {
                format!("  v{}: {} (applied: {})", version, name, applied_at)
            }
        };

        write!(f, "{}", text)
    }
}
