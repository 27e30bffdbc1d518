#[cfg(test)]
mod tests {
    use fieldbook::db::db::Db;
    use fieldbook::db::inventory::Inventory;
    use fieldbook::db::job_items::JobItems;
    use fieldbook::db::jobs::Jobs;
    use fieldbook::db::schema::SCHEMA_VERSION;
    use fieldbook::libs::backup::{Backup, BackupFile};
    use fieldbook::libs::error::RepoError;
    use fieldbook::libs::event_log::EventLog;
    use fieldbook::libs::inventory_item::{InventoryItem, NewInventoryItem};
    use fieldbook::libs::job::{Job, NewJob};
    use fieldbook::libs::job_item::{ItemState, JobItem, JobItemType, NewJobItem};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct BackupTestContext {
        temp_dir: TempDir,
        source: Db,
        target: Db,
    }

    impl TestContext for BackupTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let source = Db::open(temp_dir.path().join("source.db")).unwrap();
            let target = Db::open(temp_dir.path().join("target.db")).unwrap();

            let job = Jobs::new(&source).create(NewJob::titled("Garage")).unwrap();
            let items = JobItems::new(&source);
            let item = items.create(&job.id, NewJobItem::new(JobItemType::Buy, "Hinges")).unwrap();
            items.set_done(&item.id, true).unwrap();
            Inventory::new(&source).create(NewInventoryItem::named("Bisagras")).unwrap();

            BackupTestContext {
                temp_dir,
                source,
                target,
            }
        }
    }

    impl BackupTestContext {
        fn snapshot_path(&self) -> PathBuf {
            self.temp_dir.path().join("snapshot.json")
        }
    }

    #[test_context(BackupTestContext)]
    #[test]
    fn test_export_contains_every_table(ctx: &mut BackupTestContext) {
        let backup = Backup::export(&ctx.source).unwrap();

        assert_eq!(backup.schema_version, SCHEMA_VERSION);
        assert_eq!(backup.app.name, "fieldbook");
        assert_eq!(backup.data.jobs.len(), 1);
        assert_eq!(backup.data.job_items.len(), 1);
        assert_eq!(backup.data.inventory_items.len(), 1);
        assert_eq!(backup.data.event_logs.len(), ctx.source.count::<EventLog>().unwrap());
    }

    #[test_context(BackupTestContext)]
    #[test]
    fn test_restore_into_empty_store(ctx: &mut BackupTestContext) {
        let backup = Backup::export(&ctx.source).unwrap();
        let before = ctx.target.count::<EventLog>().unwrap();

        let report = Backup::restore(&ctx.target, &backup).unwrap();
        assert_eq!(report.jobs, 1);
        assert_eq!(report.job_items, 1);
        assert_eq!(report.inventory_items, 1);
        assert_eq!(report.event_logs, backup.data.event_logs.len());
        assert_eq!(before, 0);

        let jobs: Vec<Job> = ctx.target.all().unwrap();
        assert_eq!(jobs, backup.data.jobs);
        let items: Vec<JobItem> = ctx.target.all().unwrap();
        assert_eq!(items, backup.data.job_items);
        assert_eq!(ctx.target.count::<EventLog>().unwrap(), backup.data.event_logs.len());
    }

    #[test_context(BackupTestContext)]
    #[test]
    fn test_restore_twice_conflicts_and_changes_nothing(ctx: &mut BackupTestContext) {
        let backup = Backup::export(&ctx.source).unwrap();
        Backup::restore(&ctx.target, &backup).unwrap();
        let events = ctx.target.count::<EventLog>().unwrap();

        let err = Backup::restore(&ctx.target, &backup).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(ctx.target.count::<Job>().unwrap(), 1);
        assert_eq!(ctx.target.count::<EventLog>().unwrap(), events);
    }

    #[test_context(BackupTestContext)]
    #[test]
    fn test_restore_rejects_other_schema_version(ctx: &mut BackupTestContext) {
        let mut backup = Backup::export(&ctx.source).unwrap();
        backup.schema_version = SCHEMA_VERSION + 1;

        let err = Backup::restore(&ctx.target, &backup).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(ctx.target.count::<Job>().unwrap(), 0);
    }

    #[test_context(BackupTestContext)]
    #[test]
    fn test_restore_derives_name_key_again(ctx: &mut BackupTestContext) {
        let mut backup = Backup::export(&ctx.source).unwrap();
        backup.data.inventory_items[0].name_key = "stale".to_string();

        Backup::restore(&ctx.target, &backup).unwrap();
        let items: Vec<InventoryItem> = ctx.target.all().unwrap();
        assert_eq!(items[0].name_key, "bisagras");
    }

    #[test_context(BackupTestContext)]
    #[test]
    fn test_restore_rolls_back_on_name_collision(ctx: &mut BackupTestContext) {
        let mut backup = Backup::export(&ctx.source).unwrap();
        let mut twin = backup.data.inventory_items[0].clone();
        twin.id = "twin".to_string();
        twin.name = "BISAGRAS".to_string();
        backup.data.inventory_items.push(twin);

        let err = Backup::restore(&ctx.target, &backup).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(ctx.target.count::<Job>().unwrap(), 0);
        assert_eq!(ctx.target.count::<JobItem>().unwrap(), 0);
        assert_eq!(ctx.target.count::<InventoryItem>().unwrap(), 0);
    }

    #[test_context(BackupTestContext)]
    #[test]
    fn test_restore_repairs_done_pairing(ctx: &mut BackupTestContext) {
        let mut backup = Backup::export(&ctx.source).unwrap();
        let mut pending = backup.data.job_items[0].clone();
        backup.data.job_items[0].done_at = None;
        pending.id = "pending".to_string();
        pending.state = ItemState::Pending;
        backup.data.job_items.push(pending);

        Backup::restore(&ctx.target, &backup).unwrap();

        let done: JobItem = ctx.target.get(&backup.data.job_items[0].id).unwrap().unwrap();
        assert_eq!(done.state, ItemState::Done);
        assert_eq!(done.done_at, Some(done.updated_at));

        let pending: JobItem = ctx.target.get("pending").unwrap().unwrap();
        assert!(pending.done_at.is_none());
    }

    #[test_context(BackupTestContext)]
    #[test]
    fn test_file_round_trip(ctx: &mut BackupTestContext) {
        let backup = Backup::export(&ctx.source).unwrap();
        backup.write_to(ctx.snapshot_path()).unwrap();

        let loaded: BackupFile = Backup::read_from(ctx.snapshot_path()).unwrap();
        assert_eq!(loaded, backup);

        let raw = std::fs::read_to_string(ctx.snapshot_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["data"]["job_items"][0]["type"].is_string());
        assert!(value["exported_at"].as_str().unwrap().ends_with('Z'));
    }

    #[test_context(BackupTestContext)]
    #[test]
    fn test_read_from_missing_sections_defaults_to_empty(ctx: &mut BackupTestContext) {
        let raw = format!(
            r#"{{"schema_version":{SCHEMA_VERSION},"exported_at":"2025-01-01T00:00:00.000000Z","app":{{"name":"fieldbook","build":"0.1.0"}},"data":{{}}}}"#
        );
        std::fs::write(ctx.snapshot_path(), raw).unwrap();

        let backup = Backup::read_from(ctx.snapshot_path()).unwrap();
        let report = Backup::restore(&ctx.target, &backup).unwrap();
        assert_eq!(report.jobs + report.job_items + report.inventory_items + report.event_logs, 0);
    }
}
