#[cfg(test)]
mod tests {
    use fieldbook::db::db::{Db, DB_FILE_NAME};
    use fieldbook::db::event_logs::EventLogs;
    use fieldbook::libs::event_log::{AuditAction, EntityType, EventFilter, EventLog};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct EventLogsTestContext {
        _temp_dir: TempDir,
        db: Db,
        events: EventLogs,
    }

    impl TestContext for EventLogsTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join(DB_FILE_NAME)).unwrap();
            let events = EventLogs::new(&db);
            EventLogsTestContext {
                _temp_dir: temp_dir,
                db,
                events,
            }
        }
    }

    impl EventLogsTestContext {
        fn seed(&self) {
            self.events.append(EntityType::Job, "j1", AuditAction::JobCreated, json!({})).unwrap();
            self.events.append(EntityType::JobItem, "i1", AuditAction::ItemCreated, json!({})).unwrap();
            self.events.append(EntityType::Job, "j2", AuditAction::JobCreated, json!({})).unwrap();
            self.events.append(EntityType::Job, "j1", AuditAction::JobUpdated, json!({})).unwrap();
            self.events.append(EntityType::Inventory, "j1", AuditAction::InvCreated, json!({})).unwrap();
        }
    }

    fn actions(events: &[EventLog]) -> Vec<(&str, &str)> {
        events.iter().map(|event| (event.entity_id.as_str(), event.action.as_str())).collect()
    }

    #[test_context(EventLogsTestContext)]
    #[test]
    fn test_append_stamps_id_and_time(ctx: &mut EventLogsTestContext) {
        let before = ctx.db.now();
        let event = ctx
            .events
            .append(EntityType::Job, "j1", AuditAction::JobStatusChanged, json!({ "status": "EXEC" }))
            .unwrap();

        assert!(!event.id.is_empty());
        assert!(event.timestamp > before);
        assert_eq!(event.action, "JOB_STATUS_CHANGED");
        assert_eq!(event.meta, json!({ "status": "EXEC" }));

        let stored: EventLog = ctx.db.get(&event.id).unwrap().unwrap();
        assert_eq!(stored, event);
    }

    #[test_context(EventLogsTestContext)]
    #[test]
    fn test_null_meta_becomes_empty_object(ctx: &mut EventLogsTestContext) {
        let event = ctx.events.append(EntityType::Job, "j1", AuditAction::JobArchived, Value::Null).unwrap();
        assert_eq!(event.meta, json!({}));
    }

    #[test_context(EventLogsTestContext)]
    #[test]
    fn test_record_wraps_successful_append(ctx: &mut EventLogsTestContext) {
        let event = ctx.events.record(EntityType::Job, "j1", AuditAction::JobCreated, json!({})).unwrap();
        assert_eq!(event.entity_type, EntityType::Job);
        assert_eq!(ctx.db.count::<EventLog>().unwrap(), 1);
    }

    #[test_context(EventLogsTestContext)]
    #[test]
    fn test_list_everything_most_recent_first(ctx: &mut EventLogsTestContext) {
        ctx.seed();

        let events = ctx.events.list(&EventFilter::default()).unwrap();
        assert_eq!(
            actions(&events),
            vec![
                ("j1", "INV_CREATED"),
                ("j1", "JOB_UPDATED"),
                ("j2", "JOB_CREATED"),
                ("i1", "ITEM_CREATED"),
                ("j1", "JOB_CREATED")
            ]
        );
    }

    #[test_context(EventLogsTestContext)]
    #[test]
    fn test_list_by_type_and_id(ctx: &mut EventLogsTestContext) {
        ctx.seed();

        let events = ctx.events.list(&EventFilter::for_entity(EntityType::Job, "j1")).unwrap();
        assert_eq!(actions(&events), vec![("j1", "JOB_UPDATED"), ("j1", "JOB_CREATED")]);
    }

    #[test_context(EventLogsTestContext)]
    #[test]
    fn test_list_by_type(ctx: &mut EventLogsTestContext) {
        ctx.seed();

        let events = ctx.events.list(&EventFilter::for_type(EntityType::Job)).unwrap();
        assert_eq!(
            actions(&events),
            vec![("j1", "JOB_UPDATED"), ("j2", "JOB_CREATED"), ("j1", "JOB_CREATED")]
        );
    }

    #[test_context(EventLogsTestContext)]
    #[test]
    fn test_list_by_id_spans_types(ctx: &mut EventLogsTestContext) {
        ctx.seed();

        let events = ctx
            .events
            .list(&EventFilter {
                entity_id: Some("j1".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            actions(&events),
            vec![("j1", "INV_CREATED"), ("j1", "JOB_UPDATED"), ("j1", "JOB_CREATED")]
        );
    }

    #[test_context(EventLogsTestContext)]
    #[test]
    fn test_list_respects_limit(ctx: &mut EventLogsTestContext) {
        ctx.seed();

        let latest = ctx
            .events
            .list(&EventFilter {
                limit: 2,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(actions(&latest), vec![("j1", "INV_CREATED"), ("j1", "JOB_UPDATED")]);

        let one = ctx
            .events
            .list(&EventFilter {
                entity_id: Some("j1".to_string()),
                limit: 1,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(one.len(), 1);
    }
}
