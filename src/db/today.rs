//! Today view: what needs attention right now.
//!
//! Read-only. Builds two lists of PENDING job items, each paired with its
//! parent job:
//!
//! - **urgent**: items flagged URGENT, in insertion order
//! - **due**: items whose reminder is at or before now, earliest first
//!
//! Everything is read inside one transaction so both lists and the job
//! lookup see the same snapshot. An item whose job no longer exists is
//! returned with `job: None`.

use super::db::Db;
use super::schema::{IndexKey, IndexQuery, JOBS, JOB_ITEMS};
use crate::libs::error::RepoResult;
use crate::libs::job::Job;
use crate::libs::job_item::{ItemState, ItemUrgency, JobItem};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_LIMIT_URGENT: usize = 20;
pub const DEFAULT_LIMIT_DUE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodayLimits {
    pub limit_urgent: usize,
    pub limit_due: usize,
}

impl Default for TodayLimits {
    fn default() -> Self {
        TodayLimits {
            limit_urgent: DEFAULT_LIMIT_URGENT,
            limit_due: DEFAULT_LIMIT_DUE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayEntry {
    pub item: JobItem,
    pub job: Option<Job>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodaySnapshot {
    pub now: DateTime<Utc>,
    pub urgent: Vec<TodayEntry>,
    pub due: Vec<TodayEntry>,
}

#[derive(Clone)]
pub struct Today {
    db: Db,
}

impl Today {
    pub fn new(db: &Db) -> Self {
        Today { db: db.clone() }
    }

    pub fn snapshot(&self, limits: TodayLimits) -> RepoResult<TodaySnapshot> {
        let now = self.db.now();

        self.db.transaction(&[JOB_ITEMS.table, JOBS.table], |tx| {
            let urgent_key = IndexKey::tuple([
                IndexKey::from(ItemState::Pending.as_str()),
                IndexKey::from(ItemUrgency::Urgent.as_str()),
            ]);
            let urgent: Vec<JobItem> = tx.query(&IndexQuery::equals("state+urgency", urgent_key).limit(limits.limit_urgent))?;

            // The cap applies to pending items only, so filter before truncating.
            let reminded: Vec<JobItem> = tx.query(&IndexQuery::at_most("reminder_at", now))?;
            let mut due: Vec<JobItem> = reminded
                .into_iter()
                .filter(|item| item.state == ItemState::Pending && item.reminder_at.is_some())
                .take(limits.limit_due)
                .collect();
            due.sort_by_key(|item| item.reminder_at);

            let mut job_ids: Vec<String> = urgent.iter().chain(due.iter()).map(|item| item.job_id.clone()).collect();
            job_ids.sort();
            job_ids.dedup();
            let jobs: HashMap<String, Job> = tx.bulk_get(&job_ids)?;

            let attach = |items: Vec<JobItem>| -> Vec<TodayEntry> {
                items
                    .into_iter()
                    .map(|item| {
                        let job = jobs.get(&item.job_id).cloned();
                        TodayEntry { item, job }
                    })
                    .collect()
            };

            Ok(TodaySnapshot {
                now,
                urgent: attach(urgent),
                due: attach(due),
            })
        })
    }
}
