//! Job repository.
//!
//! Owns every write to the `jobs` table. Each mutation is committed first and
//! audited second through [`EventLogs`]. The semantic helpers (`set_status`,
//! `set_priority`, `archive`) go through [`Jobs::update`] and then add their
//! own event, so one call leaves two records: JOB_UPDATED with the patch and
//! a specific event with the new value.

use super::db::{Db, Entity};
use super::event_logs::EventLogs;
use super::schema::{IndexQuery, TableSchema, JOBS};
use crate::libs::clock::is_storable;
use crate::libs::error::{RepoError, RepoResult};
use crate::libs::event_log::{AuditAction, EntityType};
use crate::libs::job::{Job, JobFilter, JobPatch, JobPriority, JobStatus, NewJob};
use crate::libs::messages::Message;
use crate::msg_debug;
use serde_json::json;
use uuid::Uuid;

/// Suffix appended to the title of a duplicated job.
pub const DEFAULT_COPY_SUFFIX: &str = " (copy)";

impl Entity for Job {
    const SCHEMA: &'static TableSchema = &JOBS;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct Jobs {
    db: Db,
    events: EventLogs,
}

impl Jobs {
    pub fn new(db: &Db) -> Self {
        Jobs {
            db: db.clone(),
            events: EventLogs::new(db),
        }
    }

    /// Lists jobs ordered by `sort_order`, most recently updated first on ties.
    ///
    /// Archived jobs are skipped unless `include_archived` is set. `search`
    /// is a case-insensitive substring match over title and reference.
    pub fn list(&self, filter: &JobFilter) -> RepoResult<Vec<Job>> {
        let mut jobs: Vec<Job> = match filter.status {
            Some(status) => self.db.query(&IndexQuery::equals("status", status.as_str()))?,
            None => self.db.all()?,
        };

        if !filter.include_archived {
            jobs.retain(|job| !job.is_archived());
        }

        let search = filter.search.as_deref().unwrap_or_default().trim().to_lowercase();
        if !search.is_empty() {
            jobs.retain(|job| job.search_text().contains(&search));
        }

        jobs.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| b.updated_at.cmp(&a.updated_at)));
        Ok(jobs)
    }

    pub fn get(&self, id: &str) -> RepoResult<Option<Job>> {
        Ok(self.db.get(id)?)
    }

    pub fn create(&self, payload: NewJob) -> RepoResult<Job> {
        let title = validate_title(&payload.title)?;
        let now = self.db.now();
        let job = Job {
            id: Uuid::new_v4().to_string(),
            title,
            reference: payload.reference,
            status: payload.status.unwrap_or(JobStatus::Prep),
            priority: payload.priority.unwrap_or(JobPriority::Normal),
            site: payload.site,
            sort_order: now.timestamp_micros(),
            created_at: now,
            updated_at: now,
            archived_at: None,
        };

        self.db.add(&job)?;
        msg_debug!(Message::JobCreated(job.title.clone()));
        self.events
            .record(EntityType::Job, &job.id, AuditAction::JobCreated, json!({ "title": job.title }))?;

        Ok(job)
    }

    /// Merges `patch` over the stored job and stamps `updated_at`.
    pub fn update(&self, id: &str, patch: JobPatch) -> RepoResult<Job> {
        let mut job: Job = self.db.get(id)?.ok_or_else(|| RepoError::not_found("job", id))?;
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(Some(archived_at)) = &patch.archived_at {
            if !is_storable(archived_at) {
                return Err(RepoError::Validation(format!("archived_at is out of range: {archived_at}")));
            }
        }

        patch.apply_to(&mut job);
        job.updated_at = self.db.now();

        self.db.put(&job)?;
        msg_debug!(Message::JobUpdated(job.id.clone()));
        self.events
            .record(EntityType::Job, id, AuditAction::JobUpdated, json!({ "patch": patch }))?;

        Ok(job)
    }

    pub fn set_status(&self, id: &str, status: JobStatus) -> RepoResult<Job> {
        let job = self.update(
            id,
            JobPatch {
                status: Some(status),
                ..Default::default()
            },
        )?;
        self.events
            .record(EntityType::Job, id, AuditAction::JobStatusChanged, json!({ "status": status }))?;
        Ok(job)
    }

    pub fn set_priority(&self, id: &str, priority: JobPriority) -> RepoResult<Job> {
        let job = self.update(
            id,
            JobPatch {
                priority: Some(priority),
                ..Default::default()
            },
        )?;
        self.events
            .record(EntityType::Job, id, AuditAction::JobPriorityChanged, json!({ "priority": priority }))?;
        Ok(job)
    }

    pub fn archive(&self, id: &str) -> RepoResult<Job> {
        let job = self.update(
            id,
            JobPatch {
                archived_at: Some(Some(self.db.now())),
                ..Default::default()
            },
        )?;
        self.events.record(EntityType::Job, id, AuditAction::JobArchived, json!({}))?;
        Ok(job)
    }

    /// Creates a copy of a job (title + suffix, reference, status, priority, site).
    ///
    /// `title_suffix` defaults to [`DEFAULT_COPY_SUFFIX`]. The copy gets its
    /// own JOB_CREATED event plus JOB_DUPLICATED pointing at the source.
    pub fn duplicate(&self, id: &str, title_suffix: Option<&str>) -> RepoResult<Job> {
        let source: Job = self.db.get(id)?.ok_or_else(|| RepoError::not_found("job", id))?;

        let copy = self.create(NewJob {
            title: format!("{}{}", source.title, title_suffix.unwrap_or(DEFAULT_COPY_SUFFIX)),
            reference: source.reference,
            status: Some(source.status),
            priority: Some(source.priority),
            site: source.site,
        })?;

        self.events
            .record(EntityType::Job, &copy.id, AuditAction::JobDuplicated, json!({ "from_job_id": id }))?;

        Ok(copy)
    }
}

fn validate_title(title: &str) -> RepoResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(RepoError::Validation("job title must not be empty".to_string()));
    }
    Ok(title.to_string())
}
