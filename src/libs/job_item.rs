use crate::libs::clock::rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobItemType {
    Note,
    Buy,
    Material,
}

impl JobItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobItemType::Note => "NOTE",
            JobItemType::Buy => "BUY",
            JobItemType::Material => "MATERIAL",
        }
    }
}

impl fmt::Display for JobItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemUrgency {
    Normal,
    Urgent,
}

impl ItemUrgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemUrgency::Normal => "NORMAL",
            ItemUrgency::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for ItemUrgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemState {
    Pending,
    Done,
}

impl ItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemState::Pending => "PENDING",
            ItemState::Done => "DONE",
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Where to buy something.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// A sub-task of a job.
///
/// Invariant: `state == Done` exactly when `done_at` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobItem {
    pub id: String,
    pub job_id: String,
    #[serde(rename = "type")]
    pub item_type: JobItemType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub urgency: ItemUrgency,
    pub state: ItemState,
    pub sort_order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreRef>,
    #[serde(default, with = "rfc3339::option")]
    pub reminder_at: Option<DateTime<Utc>>,
    #[serde(with = "rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, with = "rfc3339::option")]
    pub done_at: Option<DateTime<Utc>>,
}

impl JobItem {
    pub fn is_done(&self) -> bool {
        self.state == ItemState::Done
    }

    /// Re-establishes the DONE/done_at pairing after a merge.
    ///
    /// DONE without a timestamp is stamped with `now`; any other state
    /// clears the timestamp.
    pub fn apply_done_invariant(&mut self, now: DateTime<Utc>) {
        match self.state {
            ItemState::Done if self.done_at.is_none() => self.done_at = Some(now),
            ItemState::Done => {}
            ItemState::Pending => self.done_at = None,
        }
    }
}

/// Input for creating a job item. Urgency defaults to NORMAL.
#[derive(Debug, Clone)]
pub struct NewJobItem {
    pub item_type: JobItemType,
    pub title: String,
    pub details: Option<String>,
    pub urgency: Option<ItemUrgency>,
    pub quantity: Option<Quantity>,
    pub store: Option<StoreRef>,
    pub reminder_at: Option<DateTime<Utc>>,
}

impl NewJobItem {
    pub fn new(item_type: JobItemType, title: &str) -> Self {
        NewJobItem {
            item_type,
            title: title.to_string(),
            details: None,
            urgency: None,
            quantity: None,
            store: None,
            reminder_at: None,
        }
    }

    pub fn urgent(mut self) -> Self {
        self.urgency = Some(ItemUrgency::Urgent);
        self
    }

    pub fn remind_at(mut self, reminder_at: DateTime<Utc>) -> Self {
        self.reminder_at = Some(reminder_at);
        self
    }
}

/// Partial update for a job item. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobItemPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<JobItemType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<ItemUrgency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ItemState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Option<Quantity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<Option<StoreRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_at: Option<Option<DateTime<Utc>>>,
}

impl JobItemPatch {
    /// Merges the patch over `item`. Identity, owner and `created_at` are never touched.
    pub fn apply_to(&self, item: &mut JobItem) {
        if let Some(item_type) = self.item_type {
            item.item_type = item_type;
        }
        if let Some(title) = &self.title {
            item.title = title.trim().to_string();
        }
        if let Some(details) = &self.details {
            item.details = details.clone();
        }
        if let Some(urgency) = self.urgency {
            item.urgency = urgency;
        }
        if let Some(state) = self.state {
            item.state = state;
        }
        if let Some(sort_order) = self.sort_order {
            item.sort_order = sort_order;
        }
        if let Some(quantity) = &self.quantity {
            item.quantity = quantity.clone();
        }
        if let Some(store) = &self.store {
            item.store = store.clone();
        }
        if let Some(reminder_at) = self.reminder_at {
            item.reminder_at = reminder_at;
        }
        if let Some(done_at) = self.done_at {
            item.done_at = done_at;
        }
    }
}
