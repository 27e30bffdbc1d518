//! Inventory repository.
//!
//! Supplies are deduplicated by `name_key`, the normalized form of the
//! display name (see [`normalize_text`]). Two names that differ only in
//! case, accents or spacing can never coexist; `create` and renames fail
//! with [`RepoError::Conflict`] instead.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fieldbook::db::db::Db;
//! use fieldbook::db::inventory::Inventory;
//! use fieldbook::libs::inventory_item::NewInventoryItem;
//!
//! let db = Db::open_in_memory()?;
//! let inventory = Inventory::new(&db);
//! let screws = inventory.create(NewInventoryItem::named("Tornillos 4x40"))?;
//! let dupe = inventory.create(NewInventoryItem::named("tornillos  4X40"));
//! assert!(dupe.is_err());
//! # Ok::<(), fieldbook::libs::error::RepoError>(())
//! ```

use super::db::{Db, Entity};
use super::event_logs::EventLogs;
use super::job_items::JobItems;
use super::schema::{IndexQuery, TableSchema, INVENTORY_ITEMS};
use crate::libs::error::{RepoError, RepoResult};
use crate::libs::event_log::{AuditAction, EntityType};
use crate::libs::inventory_item::{InventoryFilter, InventoryItem, InventoryLevel, InventoryPatch, NewInventoryItem};
use crate::libs::job_item::{JobItem, JobItemType, NewJobItem, Quantity, StoreRef};
use crate::libs::messages::Message;
use crate::libs::normalize::normalize_text;
use crate::msg_debug;
use serde_json::json;
use uuid::Uuid;

impl Entity for InventoryItem {
    const SCHEMA: &'static TableSchema = &INVENTORY_ITEMS;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct Inventory {
    db: Db,
    events: EventLogs,
    job_items: JobItems,
}

impl Inventory {
    pub fn new(db: &Db) -> Self {
        Inventory {
            db: db.clone(),
            events: EventLogs::new(db),
            job_items: JobItems::new(db),
        }
    }

    /// Lists supplies by name (normalized key first, then the raw name).
    pub fn list(&self, filter: &InventoryFilter) -> RepoResult<Vec<InventoryItem>> {
        let mut items: Vec<InventoryItem> = match filter.level {
            Some(level) => self.db.query(&IndexQuery::equals("level", level.as_str()))?,
            None => self.db.all()?,
        };

        let search = filter.search.as_deref().unwrap_or_default().trim().to_lowercase();
        if !search.is_empty() {
            items.retain(|item| item.name.to_lowercase().contains(&search));
        }

        items.sort_by(|a, b| a.name_key.cmp(&b.name_key).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }

    pub fn get(&self, id: &str) -> RepoResult<Option<InventoryItem>> {
        Ok(self.db.get(id)?)
    }

    pub fn find_by_name_key(&self, name_key: &str) -> RepoResult<Option<InventoryItem>> {
        let mut found: Vec<InventoryItem> = self.db.query(&IndexQuery::equals("name_key", name_key).limit(1))?;
        Ok(found.pop())
    }

    pub fn create(&self, payload: NewInventoryItem) -> RepoResult<InventoryItem> {
        let (name, name_key) = validate_name(&payload.name)?;
        if let Some(existing) = self.find_by_name_key(&name_key)? {
            return Err(RepoError::Conflict(format!(
                "inventory item '{}' already exists as '{}'",
                name, existing.name
            )));
        }

        let now = self.db.now();
        let mut item = InventoryItem {
            id: Uuid::new_v4().to_string(),
            name,
            name_key,
            level: payload.level.unwrap_or(InventoryLevel::Missing),
            default_store: payload.default_store,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        item.absorb_tags(&payload.tags);

        self.db.add(&item)?;
        msg_debug!(Message::InventoryCreated(item.name.clone()));
        self.events.record(
            EntityType::Inventory,
            &item.id,
            AuditAction::InvCreated,
            json!({ "name": item.name, "name_key": item.name_key }),
        )?;

        Ok(item)
    }

    /// Merges `patch` over the stored item. A rename re-derives `name_key`
    /// and fails when another item already holds that key.
    pub fn update(&self, id: &str, patch: InventoryPatch) -> RepoResult<InventoryItem> {
        let mut item: InventoryItem = self.db.get(id)?.ok_or_else(|| RepoError::not_found("inventory item", id))?;

        if let Some(name) = &patch.name {
            let (name, name_key) = validate_name(name)?;
            if let Some(existing) = self.find_by_name_key(&name_key)? {
                if existing.id != item.id {
                    return Err(RepoError::Conflict(format!(
                        "inventory item '{}' already exists as '{}'",
                        name, existing.name
                    )));
                }
            }
            item.name = name;
            item.name_key = name_key;
        }
        if let Some(level) = patch.level {
            item.level = level;
        }
        if let Some(default_store) = &patch.default_store {
            item.default_store = default_store.clone();
        }
        if let Some(tags) = &patch.tags {
            item.tags.clear();
            item.absorb_tags(tags);
        }
        item.updated_at = self.db.now();

        self.db.put(&item)?;
        msg_debug!(Message::InventoryUpdated(item.id.clone()));
        self.events
            .record(EntityType::Inventory, id, AuditAction::InvUpdated, json!({ "patch": patch }))?;

        Ok(item)
    }

    pub fn set_level(&self, id: &str, level: InventoryLevel) -> RepoResult<InventoryItem> {
        let item = self.update(
            id,
            InventoryPatch {
                level: Some(level),
                ..Default::default()
            },
        )?;
        self.events
            .record(EntityType::Inventory, id, AuditAction::InvLevelChanged, json!({ "level": level }))?;
        Ok(item)
    }

    /// Folds `source_id` into `target_id` and deletes the source.
    ///
    /// The target keeps its name and gains the union of both tag lists and
    /// the more severe of the two levels. Both writes share one transaction.
    /// Merging an item into itself changes nothing.
    pub fn merge(&self, target_id: &str, source_id: &str) -> RepoResult<InventoryItem> {
        if target_id == source_id {
            return self
                .db
                .get(target_id)?
                .ok_or_else(|| RepoError::not_found("inventory item", target_id));
        }

        let now = self.db.now();
        let merged = self.db.transaction(&[INVENTORY_ITEMS.table], |tx| {
            let mut target: InventoryItem = tx
                .get(target_id)?
                .ok_or_else(|| RepoError::not_found("inventory item", target_id))?;
            let source: InventoryItem = tx
                .get(source_id)?
                .ok_or_else(|| RepoError::not_found("inventory item", source_id))?;

            target.absorb_tags(&source.tags);
            target.level = target.level.most_severe(source.level);
            target.updated_at = now;

            tx.put(&target)?;
            tx.delete::<InventoryItem>(source_id)?;
            Ok::<_, RepoError>(target)
        })?;

        msg_debug!(Message::InventoryMerged(source_id.to_string(), target_id.to_string()));
        self.events
            .record(EntityType::Inventory, target_id, AuditAction::InvMerged, json!({ "source_id": source_id }))?;

        Ok(merged)
    }

    /// Puts a supply on a job's shopping list as a BUY item.
    ///
    /// The item takes the supply's name, its default store and, when given,
    /// the quantity. The new item records its own ITEM_CREATED event; the
    /// supply gets INV_ADDED_TO_PURCHASES.
    pub fn add_to_purchases(&self, id: &str, job_id: &str, qty: Option<f64>) -> RepoResult<JobItem> {
        let item: InventoryItem = self.db.get(id)?.ok_or_else(|| RepoError::not_found("inventory item", id))?;

        let mut payload = NewJobItem::new(JobItemType::Buy, &item.name);
        payload.quantity = qty.map(|amount| Quantity { amount, unit: None });
        payload.store = item.default_store.clone().map(|name| StoreRef {
            name: Some(name),
            reference: None,
        });

        let created = self.job_items.create(job_id, payload)?;
        self.events.record(
            EntityType::Inventory,
            id,
            AuditAction::InvAddedToPurchases,
            json!({ "job_id": job_id, "job_item_id": created.id, "qty": qty }),
        )?;

        Ok(created)
    }
}

/// Trimmed display name and its dedup key; both must be non-empty.
fn validate_name(name: &str) -> RepoResult<(String, String)> {
    let name = name.trim();
    let name_key = normalize_text(name);
    if name.is_empty() || name_key.is_empty() {
        return Err(RepoError::Validation("inventory item name must not be empty".to_string()));
    }
    Ok((name.to_string(), name_key))
}
