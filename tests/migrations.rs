#[cfg(test)]
mod tests {
    use fieldbook::db::db::{Db, DB_FILE_NAME};
    use fieldbook::db::migrations::{get_db_version, init_with_migrations, needs_migration, MigrationManager};
    use fieldbook::db::schema::{SCHEMA, SCHEMA_VERSION};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct MigrationTestContext {
        _temp_dir: TempDir,
        path: PathBuf,
    }

    impl TestContext for MigrationTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let path = temp_dir.path().join(DB_FILE_NAME);
            MigrationTestContext {
                _temp_dir: temp_dir,
                path,
            }
        }
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migrations_run_automatically(ctx: &mut MigrationTestContext) {
        let db = Db::open(&ctx.path).unwrap();

        let version = db.with_connection(|conn| get_db_version(conn)).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        assert!(!db.with_connection(|conn| needs_migration(conn)).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_fresh_database_needs_migration(ctx: &mut MigrationTestContext) {
        let conn = Db::new_without_migrations(&ctx.path).unwrap();

        assert_eq!(get_db_version(&conn).unwrap(), 0);
        assert!(needs_migration(&conn).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migration_history(ctx: &mut MigrationTestContext) {
        let mut conn = Db::new_without_migrations(&ctx.path).unwrap();
        let manager = MigrationManager::new();

        assert!(manager.get_migration_history(&conn).unwrap().is_empty());

        manager.run_migrations(&mut conn).unwrap();

        let history = manager.get_migration_history(&conn).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].0, SCHEMA_VERSION);
        assert_eq!(history[0].1, "create_entity_tables");
        assert!(manager.is_migration_applied(&conn, SCHEMA_VERSION).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migrations_are_idempotent(ctx: &mut MigrationTestContext) {
        let mut conn = Db::new_without_migrations(&ctx.path).unwrap();

        init_with_migrations(&mut conn).unwrap();
        init_with_migrations(&mut conn).unwrap();

        let history = MigrationManager::new().get_migration_history(&conn).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(get_db_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_every_registered_table_exists(ctx: &mut MigrationTestContext) {
        let db = Db::open(&ctx.path).unwrap();

        for schema in SCHEMA {
            let count: i64 = db
                .with_connection(|conn| {
                    conn.query_row(
                        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                        [schema.table],
                        |row| row.get(0),
                    )
                })
                .unwrap();
            assert_eq!(count, 1, "table {} missing", schema.table);
        }

        let indexes: i64 = db
            .with_connection(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%'",
                    [],
                    |row| row.get(0),
                )
            })
            .unwrap();
        let declared: usize = SCHEMA.iter().map(|schema| schema.indexes.len()).sum();
        assert_eq!(indexes as usize, declared);
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_reopening_keeps_version(ctx: &mut MigrationTestContext) {
        drop(Db::open(&ctx.path).unwrap());
        let db = Db::open(&ctx.path).unwrap();

        let history = db
            .with_connection(|conn| MigrationManager::new().get_migration_history(conn))
            .unwrap();
        assert_eq!(history.len(), 1);
    }
}
