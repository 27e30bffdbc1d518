/// Every user-facing and diagnostic text of the application.
///
/// Variants only carry data; the wording lives in the `Display`
/// implementation in `display.rs`.
#[derive(Debug, Clone)]
pub enum Message {
    // === JOB MESSAGES ===
    JobCreated(String),
    JobUpdated(String),
    JobStatusChanged(String, String),   // title, status
    JobPriorityChanged(String, String), // title, priority
    JobArchived(String),
    JobDuplicated(String, String), // source title, copy title
    JobListHeader,
    NoJobsFound,

    // === JOB ITEM MESSAGES ===
    ItemCreated(String),
    ItemUpdated(String),
    ItemDone(String),
    ItemUndone(String),
    ItemSnoozed(String, String), // title, local reminder time
    ItemReminderCleared(String),
    ItemConverted(String),
    ItemsReordered(String, usize), // job, item count
    ItemDeleted(String),
    JobItemsHeader(String),
    NoItemsForJob(String),
    InvalidReminder(String),

    // === INVENTORY MESSAGES ===
    InventoryCreated(String),
    InventoryUpdated(String),
    InventoryRenamed(String, String),
    InventoryLevelChanged(String, String),
    InventoryMerged(String, String), // absorbed, kept
    InventoryAddedToPurchases(String, String), // supply, job
    InventoryListHeader,
    NoInventoryFound,
    ConfirmMerge(String, String),

    // === TODAY MESSAGES ===
    TodayHeader(String),
    TodayUrgentHeader(usize),
    TodayDueHeader(usize),
    TodayNothing,

    // === AUDIT LOG MESSAGES ===
    AuditAppended(String, String), // action, entity id
    EventLogHeader(usize),
    NoEventsFound,

    // === BACKUP MESSAGES ===
    BackupExported(usize, usize), // jobs, events
    BackupWritten(String, usize, usize),
    BackupRestored(usize, usize),
    BackupImported(usize, usize, usize, usize),
    ConfirmImport(String, String), // path, build

    // === LOOKUP MESSAGES ===
    RecordNotFound(String, String), // table, id
    AmbiguousId(String),

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigFileNotFound,
    ConfigModuleDatabase,
    ConfigModuleToday,
    ConfigModuleEvents,
    PromptDatabasePath,
    PromptLimitUrgent,
    PromptLimitDue,
    PromptEventLimit,

    // === GENERAL MESSAGES ===
    OperationCancelled,
    NoChangesDetected,

    // === MIGRATION MESSAGES ===
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationCompleted(u32),
    MigrationFailed(u32, String),
    AllMigrationsCompleted,
    DatabaseVersion(u32),
    DatabaseUpToDate,
    DatabaseNeedsUpdate,
    MigrationHistory,
    MigrationHistoryEntry(u32, String, String), // version, name, applied at
}
