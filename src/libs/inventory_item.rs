use crate::libs::clock::rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stock level of a supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryLevel {
    Have,
    Low,
    Missing,
}

impl InventoryLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryLevel::Have => "HAVE",
            InventoryLevel::Low => "LOW",
            InventoryLevel::Missing => "MISSING",
        }
    }

    /// Restocking need: MISSING > LOW > HAVE.
    pub fn severity(&self) -> u8 {
        match self {
            InventoryLevel::Have => 1,
            InventoryLevel::Low => 2,
            InventoryLevel::Missing => 3,
        }
    }

    /// The level that is more in need of restocking. Ties keep `self`.
    pub fn most_severe(self, other: InventoryLevel) -> InventoryLevel {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for InventoryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A supply tracked across jobs, deduplicated by `name_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub name_key: String,
    pub level: InventoryLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_store: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(with = "rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Adds the tags of `other` that are not already present, keeping order.
    pub fn absorb_tags(&mut self, other: &[String]) {
        for tag in other {
            if !self.tags.contains(tag) {
                self.tags.push(tag.clone());
            }
        }
    }
}

/// Input for creating an inventory item. Level defaults to MISSING.
#[derive(Debug, Clone, Default)]
pub struct NewInventoryItem {
    pub name: String,
    pub level: Option<InventoryLevel>,
    pub default_store: Option<String>,
    pub tags: Vec<String>,
}

impl NewInventoryItem {
    pub fn named(name: &str) -> Self {
        NewInventoryItem {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// Partial update for an inventory item. `name_key` follows `name`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InventoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<InventoryLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_store: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryFilter {
    pub level: Option<InventoryLevel>,
    pub search: Option<String>,
}
