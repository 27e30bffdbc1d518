#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use fieldbook::db::db::{Db, DB_FILE_NAME};
    use fieldbook::db::event_logs::EventLogs;
    use fieldbook::db::jobs::Jobs;
    use fieldbook::libs::error::RepoError;
    use fieldbook::libs::event_log::{EntityType, EventFilter};
    use fieldbook::libs::job::{JobFilter, JobPatch, JobPriority, JobSite, JobStatus, NewJob};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct JobsTestContext {
        _temp_dir: TempDir,
        db: Db,
        jobs: Jobs,
        events: EventLogs,
    }

    impl TestContext for JobsTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join(DB_FILE_NAME)).unwrap();
            JobsTestContext {
                _temp_dir: temp_dir,
                jobs: Jobs::new(&db),
                events: EventLogs::new(&db),
                db,
            }
        }
    }

    impl JobsTestContext {
        fn actions(&self, job_id: &str) -> Vec<String> {
            self.events
                .list(&EventFilter::for_entity(EntityType::Job, job_id))
                .unwrap()
                .into_iter()
                .map(|event| event.action)
                .collect()
        }
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_create_applies_defaults(ctx: &mut JobsTestContext) {
        let job = ctx.jobs.create(NewJob::titled("  Kitchen refit  ")).unwrap();

        assert_eq!(job.title, "Kitchen refit");
        assert_eq!(job.status, JobStatus::Prep);
        assert_eq!(job.priority, JobPriority::Normal);
        assert!(job.archived_at.is_none());
        assert_eq!(job.created_at, job.updated_at);
        assert_eq!(ctx.jobs.get(&job.id).unwrap(), Some(job.clone()));
        assert_eq!(ctx.actions(&job.id), vec!["JOB_CREATED"]);
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_create_rejects_blank_title(ctx: &mut JobsTestContext) {
        let err = ctx.jobs.create(NewJob::titled("   ")).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(ctx.jobs.list(&JobFilter::default()).unwrap().is_empty());
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_sort_order_increases_with_creation(ctx: &mut JobsTestContext) {
        let first = ctx.jobs.create(NewJob::titled("First")).unwrap();
        let second = ctx.jobs.create(NewJob::titled("Second")).unwrap();
        assert!(second.sort_order > first.sort_order);
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_update_merges_patch(ctx: &mut JobsTestContext) {
        let job = ctx.jobs.create(NewJob::titled("Roof")).unwrap();

        let updated = ctx
            .jobs
            .update(
                &job.id,
                JobPatch {
                    reference: Some(Some("Q-2041".to_string())),
                    site: Some(Some(JobSite {
                        address: Some("12 Harbour Rd".to_string()),
                        ..Default::default()
                    })),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, job.id);
        assert_eq!(updated.title, "Roof");
        assert_eq!(updated.reference.as_deref(), Some("Q-2041"));
        assert_eq!(updated.created_at, job.created_at);
        assert!(updated.updated_at > job.updated_at);
        assert_eq!(ctx.actions(&job.id), vec!["JOB_UPDATED", "JOB_CREATED"]);
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_update_missing_job(ctx: &mut JobsTestContext) {
        let err = ctx.jobs.update("nope", JobPatch::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_update_rejects_blank_title(ctx: &mut JobsTestContext) {
        let job = ctx.jobs.create(NewJob::titled("Roof")).unwrap();
        let err = ctx
            .jobs
            .update(
                &job.id,
                JobPatch {
                    title: Some(" ".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(ctx.jobs.get(&job.id).unwrap().unwrap().title, "Roof");
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_semantic_helpers_record_two_events(ctx: &mut JobsTestContext) {
        let job = ctx.jobs.create(NewJob::titled("Fence")).unwrap();

        let job = ctx.jobs.set_status(&job.id, JobStatus::Exec).unwrap();
        assert_eq!(job.status, JobStatus::Exec);
        let job = ctx.jobs.set_priority(&job.id, JobPriority::Urgent).unwrap();
        assert_eq!(job.priority, JobPriority::Urgent);

        assert_eq!(
            ctx.actions(&job.id),
            vec![
                "JOB_PRIORITY_CHANGED",
                "JOB_UPDATED",
                "JOB_STATUS_CHANGED",
                "JOB_UPDATED",
                "JOB_CREATED"
            ]
        );

        let events = ctx.events.list(&EventFilter::for_entity(EntityType::Job, &job.id)).unwrap();
        assert_eq!(events[0].meta["priority"], "URGENT");
        assert_eq!(events[2].meta["status"], "EXEC");
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_archive_hides_job_from_default_list(ctx: &mut JobsTestContext) {
        let kept = ctx.jobs.create(NewJob::titled("Kept")).unwrap();
        let archived = ctx.jobs.create(NewJob::titled("Archived")).unwrap();

        let archived = ctx.jobs.archive(&archived.id).unwrap();
        assert!(archived.archived_at.is_some());
        assert_eq!(ctx.actions(&archived.id)[0], "JOB_ARCHIVED");

        let visible = ctx.jobs.list(&JobFilter::default()).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, kept.id);

        let everything = ctx
            .jobs
            .list(&JobFilter {
                include_archived: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(everything.len(), 2);
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_list_filters_by_status_and_search(ctx: &mut JobsTestContext) {
        let mut deck = NewJob::titled("Deck repair");
        deck.reference = Some("PO-77".to_string());
        let deck = ctx.jobs.create(deck).unwrap();
        let shed = ctx.jobs.create(NewJob::titled("Shed")).unwrap();
        ctx.jobs.set_status(&shed.id, JobStatus::Exec).unwrap();

        let exec = ctx
            .jobs
            .list(&JobFilter {
                status: Some(JobStatus::Exec),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(exec.len(), 1);
        assert_eq!(exec[0].id, shed.id);

        let by_reference = ctx
            .jobs
            .list(&JobFilter {
                search: Some("po-7".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_reference.len(), 1);
        assert_eq!(by_reference[0].id, deck.id);

        let by_title = ctx
            .jobs
            .list(&JobFilter {
                search: Some("SHED".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_title.len(), 1);
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_list_orders_by_sort_order(ctx: &mut JobsTestContext) {
        let a = ctx.jobs.create(NewJob::titled("A")).unwrap();
        let b = ctx.jobs.create(NewJob::titled("B")).unwrap();
        let c = ctx.jobs.create(NewJob::titled("C")).unwrap();

        ctx.jobs
            .update(
                &c.id,
                JobPatch {
                    sort_order: Some(a.sort_order - 1),
                    ..Default::default()
                },
            )
            .unwrap();

        let ids: Vec<String> = ctx.jobs.list(&JobFilter::default()).unwrap().into_iter().map(|job| job.id).collect();
        assert_eq!(ids, vec![c.id, a.id, b.id]);
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_equal_sort_order_puts_recently_updated_first(ctx: &mut JobsTestContext) {
        let a = ctx.jobs.create(NewJob::titled("A")).unwrap();
        let b = ctx.jobs.create(NewJob::titled("B")).unwrap();
        let pinned = JobPatch {
            sort_order: Some(1),
            ..Default::default()
        };
        ctx.jobs.update(&b.id, pinned.clone()).unwrap();
        ctx.jobs.update(&a.id, pinned).unwrap();

        let ids: Vec<String> = ctx.jobs.list(&JobFilter::default()).unwrap().into_iter().map(|job| job.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_duplicate_copies_fields(ctx: &mut JobsTestContext) {
        let mut payload = NewJob::titled("Bathroom");
        payload.reference = Some("R-9".to_string());
        payload.priority = Some(JobPriority::High);
        payload.site = Some(JobSite {
            contact_name: Some("Ana".to_string()),
            ..Default::default()
        });
        let source = ctx.jobs.create(payload).unwrap();
        ctx.jobs.set_status(&source.id, JobStatus::Exec).unwrap();

        let copy = ctx.jobs.duplicate(&source.id, None).unwrap();
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.title, "Bathroom (copy)");
        assert_eq!(copy.reference.as_deref(), Some("R-9"));
        assert_eq!(copy.status, JobStatus::Exec);
        assert_eq!(copy.priority, JobPriority::High);
        assert_eq!(copy.site, source.site);

        let events = ctx.events.list(&EventFilter::for_entity(EntityType::Job, &copy.id)).unwrap();
        assert_eq!(events[0].action, "JOB_DUPLICATED");
        assert_eq!(events[0].meta["from_job_id"], source.id.as_str());
        assert_eq!(events[1].action, "JOB_CREATED");

        let custom = ctx.jobs.duplicate(&source.id, Some(" v2")).unwrap();
        assert_eq!(custom.title, "Bathroom v2");
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_duplicate_missing_job(ctx: &mut JobsTestContext) {
        let err = ctx.jobs.duplicate("nope", None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_failed_audit_keeps_committed_change(ctx: &mut JobsTestContext) {
        ctx.db
            .with_connection(|conn| conn.execute("DROP TABLE event_logs", []))
            .unwrap();

        let err = ctx.jobs.create(NewJob::titled("Bathroom")).unwrap_err();
        let entity_id = match err {
            RepoError::AuditAppend { action, entity_id, .. } => {
                assert_eq!(action, "JOB_CREATED");
                entity_id
            }
            other => panic!("expected an audit failure, got {other:?}"),
        };

        let job = ctx.jobs.get(&entity_id).unwrap().unwrap();
        assert_eq!(job.title, "Bathroom");
    }

    #[test_context(JobsTestContext)]
    #[test]
    fn test_update_rejects_archived_at_beyond_year_9999(ctx: &mut JobsTestContext) {
        let job = ctx.jobs.create(NewJob::titled("Roof")).unwrap();
        let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();

        let err = ctx
            .jobs
            .update(
                &job.id,
                JobPatch {
                    archived_at: Some(Some(far)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(ctx.jobs.get(&job.id).unwrap(), Some(job));
    }
}
