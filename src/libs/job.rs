use crate::libs::clock::rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Prep,
    Exec,
    Done,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Prep => "PREP",
            JobStatus::Exec => "EXEC",
            JobStatus::Done => "DONE",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPriority {
    Normal,
    High,
    Urgent,
}

impl JobPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPriority::Normal => "NORMAL",
            JobPriority::High => "HIGH",
            JobPriority::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for JobPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the work happens and who to call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_note: Option<String>,
}

/// A unit of work.
///
/// `created_at` is fixed at creation; `updated_at` advances on every
/// mutation. A non-null `archived_at` hides the job from default listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub status: JobStatus,
    pub priority: JobPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<JobSite>,
    pub sort_order: i64,
    #[serde(with = "rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, with = "rfc3339::option")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Text matched by the list search: title and reference.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.reference.as_deref().unwrap_or_default()).to_lowercase()
    }
}

/// Input for creating a job. Unset status/priority default to PREP/NORMAL.
#[derive(Debug, Clone, Default)]
pub struct NewJob {
    pub title: String,
    pub reference: Option<String>,
    pub status: Option<JobStatus>,
    pub priority: Option<JobPriority>,
    pub site: Option<JobSite>,
}

impl NewJob {
    pub fn titled(title: &str) -> Self {
        NewJob {
            title: title.to_string(),
            ..Default::default()
        }
    }
}

/// Partial update for a job.
///
/// Outer `None` leaves the field alone; for nullable fields `Some(None)`
/// clears the value. Serialized as the `patch` of the JOB_UPDATED event.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<JobPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<Option<JobSite>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<Option<DateTime<Utc>>>,
}

impl JobPatch {
    /// Merges the patch over `job`. Identity and `created_at` are never touched.
    pub fn apply_to(&self, job: &mut Job) {
        if let Some(title) = &self.title {
            job.title = title.trim().to_string();
        }
        if let Some(reference) = &self.reference {
            job.reference = reference.clone();
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(priority) = self.priority {
            job.priority = priority;
        }
        if let Some(site) = &self.site {
            job.site = site.clone();
        }
        if let Some(sort_order) = self.sort_order {
            job.sort_order = sort_order;
        }
        if let Some(archived_at) = self.archived_at {
            job.archived_at = archived_at;
        }
    }
}

/// Criteria for [`crate::db::jobs::Jobs::list`].
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub include_archived: bool,
    pub search: Option<String>,
}
