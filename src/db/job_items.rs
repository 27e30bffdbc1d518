//! Job item repository.
//!
//! Owns every write to `job_items` and keeps the DONE/done_at pairing intact
//! on each update. `reorder` is the one multi-record write and runs in a
//! single store transaction; its audit event is appended after the commit.

use super::db::{Db, Entity};
use super::event_logs::EventLogs;
use super::schema::{IndexQuery, TableSchema, JOB_ITEMS};
use crate::libs::clock::{format_timestamp, is_storable};
use crate::libs::error::{RepoError, RepoResult};
use crate::libs::event_log::{AuditAction, EntityType};
use crate::libs::job::Job;
use crate::libs::job_item::{ItemState, ItemUrgency, JobItem, JobItemPatch, JobItemType, NewJobItem};
use crate::libs::messages::Message;
use crate::msg_debug;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashSet;
use uuid::Uuid;

impl Entity for JobItem {
    const SCHEMA: &'static TableSchema = &JOB_ITEMS;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct JobItems {
    db: Db,
    events: EventLogs,
}

impl JobItems {
    pub fn new(db: &Db) -> Self {
        JobItems {
            db: db.clone(),
            events: EventLogs::new(db),
        }
    }

    /// Items of one job in `sort_order`, optionally without the DONE ones.
    pub fn list_by_job(&self, job_id: &str, include_done: bool) -> RepoResult<Vec<JobItem>> {
        let mut items: Vec<JobItem> = self.db.query(&IndexQuery::equals("job_id", job_id))?;

        if !include_done {
            items.retain(|item| !item.is_done());
        }

        items.sort_by_key(|item| item.sort_order);
        Ok(items)
    }

    pub fn get(&self, id: &str) -> RepoResult<Option<JobItem>> {
        Ok(self.db.get(id)?)
    }

    /// Adds a PENDING item to an existing job.
    pub fn create(&self, job_id: &str, payload: NewJobItem) -> RepoResult<JobItem> {
        let title = validate_title(&payload.title)?;
        validate_timestamp("reminder_at", payload.reminder_at.as_ref())?;
        if self.db.get::<Job>(job_id)?.is_none() {
            return Err(RepoError::not_found("job", job_id));
        }

        let now = self.db.now();
        let item = JobItem {
            id: Uuid::new_v4().to_string(),
            job_id: job_id.to_string(),
            item_type: payload.item_type,
            title,
            details: payload.details,
            urgency: payload.urgency.unwrap_or(ItemUrgency::Normal),
            state: ItemState::Pending,
            sort_order: now.timestamp_micros(),
            quantity: payload.quantity,
            store: payload.store,
            reminder_at: payload.reminder_at,
            created_at: now,
            updated_at: now,
            done_at: None,
        };

        self.db.add(&item)?;
        msg_debug!(Message::ItemCreated(item.title.clone()));
        self.events.record(
            EntityType::JobItem,
            &item.id,
            AuditAction::ItemCreated,
            json!({ "job_id": job_id, "type": item.item_type }),
        )?;

        Ok(item)
    }

    /// Merges `patch`, stamps `updated_at` and re-derives `done_at` from `state`.
    pub fn update(&self, id: &str, patch: JobItemPatch) -> RepoResult<JobItem> {
        let mut item: JobItem = self.db.get(id)?.ok_or_else(|| RepoError::not_found("job item", id))?;
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        validate_timestamp("reminder_at", patch.reminder_at.flatten().as_ref())?;
        validate_timestamp("done_at", patch.done_at.flatten().as_ref())?;

        let now = self.db.now();
        patch.apply_to(&mut item);
        item.updated_at = now;
        item.apply_done_invariant(now);

        self.db.put(&item)?;
        msg_debug!(Message::ItemUpdated(item.id.clone()));
        self.events
            .record(EntityType::JobItem, id, AuditAction::ItemUpdated, json!({ "patch": patch }))?;

        Ok(item)
    }

    /// Marks an item done or pending again.
    ///
    /// Marking an already-done item done keeps its original `done_at`.
    pub fn set_done(&self, id: &str, done: bool) -> RepoResult<JobItem> {
        let state = if done { ItemState::Done } else { ItemState::Pending };
        let item = self.update(
            id,
            JobItemPatch {
                state: Some(state),
                ..Default::default()
            },
        )?;

        let action = if done { AuditAction::ItemDone } else { AuditAction::ItemUndone };
        self.events.record(EntityType::JobItem, id, action, json!({}))?;
        Ok(item)
    }

    /// Sets or clears the follow-up reminder.
    pub fn snooze(&self, id: &str, reminder_at: Option<DateTime<Utc>>) -> RepoResult<JobItem> {
        let item = self.update(
            id,
            JobItemPatch {
                reminder_at: Some(reminder_at),
                ..Default::default()
            },
        )?;
        self.events.record(
            EntityType::JobItem,
            id,
            AuditAction::ItemSnoozed,
            json!({ "reminder_at": item.reminder_at.as_ref().map(format_timestamp) }),
        )?;
        Ok(item)
    }

    pub fn convert_to_buy(&self, id: &str) -> RepoResult<JobItem> {
        let existing: JobItem = self.db.get(id)?.ok_or_else(|| RepoError::not_found("job item", id))?;

        let item = self.update(
            id,
            JobItemPatch {
                item_type: Some(JobItemType::Buy),
                ..Default::default()
            },
        )?;
        self.events.record(
            EntityType::JobItem,
            id,
            AuditAction::ItemConverted,
            json!({ "from": existing.item_type, "to": JobItemType::Buy }),
        )?;
        Ok(item)
    }

    /// Rewrites `sort_order` to the position of each id in `ordered_ids`.
    ///
    /// All items are updated in one transaction; an unknown id or an item of
    /// another job aborts the whole reorder. One ITEM_REORDERED event is
    /// recorded on the job, carrying the full sequence.
    pub fn reorder(&self, job_id: &str, ordered_ids: &[String]) -> RepoResult<()> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = ordered_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(RepoError::Validation(format!("job item {duplicate} appears more than once")));
        }

        let now = self.db.now();

        self.db.transaction(&[JOB_ITEMS.table], |tx| {
            for (position, id) in ordered_ids.iter().enumerate() {
                let mut item: JobItem = tx.get(id)?.ok_or_else(|| RepoError::not_found("job item", id.as_str()))?;
                if item.job_id != job_id {
                    return Err(RepoError::Validation(format!("job item {id} does not belong to job {job_id}")));
                }
                item.sort_order = position as i64;
                item.updated_at = now;
                tx.put(&item)?;
            }
            Ok(())
        })?;

        msg_debug!(Message::ItemsReordered(job_id.to_string(), ordered_ids.len()));
        self.events.record(
            EntityType::Job,
            job_id,
            AuditAction::ItemReordered,
            json!({ "ordered_item_ids": ordered_ids }),
        )?;
        Ok(())
    }

    /// Removes an item. Deleting a missing id is a no-op and records nothing.
    pub fn delete(&self, id: &str) -> RepoResult<()> {
        let Some(existing) = self.db.get::<JobItem>(id)? else {
            return Ok(());
        };

        self.db.delete::<JobItem>(id)?;
        msg_debug!(Message::ItemDeleted(id.to_string()));
        self.events
            .record(EntityType::JobItem, id, AuditAction::ItemDeleted, json!({ "job_id": existing.job_id }))?;
        Ok(())
    }
}

fn validate_title(title: &str) -> RepoResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(RepoError::Validation("job item title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

fn validate_timestamp(field: &str, instant: Option<&DateTime<Utc>>) -> RepoResult<()> {
    match instant {
        Some(instant) if !is_storable(instant) => Err(RepoError::Validation(format!("{field} is out of range: {instant}"))),
        _ => Ok(()),
    }
}
