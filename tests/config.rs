#[cfg(test)]
mod tests {
    use fieldbook::db::today::TodayLimits;
    use fieldbook::libs::config::{Config, DatabaseConfig, EventsConfig, TodayConfig, CONFIG_FILE_NAME};
    use fieldbook::libs::data_storage::DataStorage;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    /// Config files are read from and written to a private temporary directory.
    struct ConfigTestContext {
        _temp_dir: TempDir,
        storage: DataStorage,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let storage = DataStorage::at(temp_dir.path().join("fieldwork").join("fieldbook"));
            ConfigTestContext {
                _temp_dir: temp_dir,
                storage,
            }
        }
    }

    impl ConfigTestContext {
        fn config_path(&self) -> PathBuf {
            self.storage.get_path(CONFIG_FILE_NAME).unwrap()
        }
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_default_config(_ctx: &mut ConfigTestContext) {
        let config = Config::default();
        assert!(config.database.is_none());
        assert!(config.today.is_none());
        assert!(config.events.is_none());

        assert_eq!(config.today_limits(), TodayLimits::default());
        assert_eq!(config.today_limits().limit_urgent, 20);
        assert_eq!(config.today_limits().limit_due, 20);
        assert_eq!(config.event_limit(), 100);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_file_reads_as_default(ctx: &mut ConfigTestContext) {
        let config = Config::read_from(&ctx.config_path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_get_path_creates_storage_directory(ctx: &mut ConfigTestContext) {
        assert!(!ctx.storage.base_path().exists());
        let path = ctx.config_path();
        assert!(ctx.storage.base_path().is_dir());
        assert_eq!(path.file_name().unwrap(), CONFIG_FILE_NAME);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read_round_trip(ctx: &mut ConfigTestContext) {
        let config = Config {
            database: Some(DatabaseConfig {
                path: Some(PathBuf::from("/srv/fieldbook/work.db")),
            }),
            today: Some(TodayConfig {
                limit_urgent: 5,
                limit_due: 50,
            }),
            events: Some(EventsConfig { list_limit: 25 }),
        };

        config.save_to(&ctx.config_path()).unwrap();
        let loaded = Config::read_from(&ctx.config_path()).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(
            loaded.today_limits(),
            TodayLimits {
                limit_urgent: 5,
                limit_due: 50
            }
        );
        assert_eq!(loaded.event_limit(), 25);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_partial_file_keeps_other_defaults(ctx: &mut ConfigTestContext) {
        std::fs::write(ctx.config_path(), r#"{ "events": { "list_limit": 7 } }"#).unwrap();

        let config = Config::read_from(&ctx.config_path()).unwrap();
        assert!(config.database.is_none());
        assert!(config.today.is_none());
        assert_eq!(config.event_limit(), 7);
        assert_eq!(config.today_limits(), TodayLimits::default());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_unset_sections_are_not_written(ctx: &mut ConfigTestContext) {
        let config = Config {
            today: Some(TodayConfig::default()),
            ..Default::default()
        };
        config.save_to(&ctx.config_path()).unwrap();

        let raw = std::fs::read_to_string(ctx.config_path()).unwrap();
        assert!(raw.contains("limit_urgent"));
        assert!(!raw.contains("database"));
        assert!(!raw.contains("events"));
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_malformed_file_is_an_error(ctx: &mut ConfigTestContext) {
        std::fs::write(ctx.config_path(), "{ not json").unwrap();
        assert!(Config::read_from(&ctx.config_path()).is_err());
    }
}
