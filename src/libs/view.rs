use super::clock::format_timestamp;
use super::event_log::EventLog;
use super::inventory_item::InventoryItem;
use super::job::Job;
use super::job_item::JobItem;
use crate::db::today::TodayEntry;
use anyhow::Result;
use chrono::{DateTime, Utc};
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn jobs(jobs: &[Job]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "TITLE", "REFERENCE", "STATUS", "PRIORITY", "UPDATED", "ARCHIVED"]);
        for job in jobs {
            table.add_row(row![
                short_id(&job.id),
                job.title,
                job.reference.as_deref().unwrap_or_default(),
                job.status,
                job.priority,
                local_time(&job.updated_at),
                job.archived_at.as_ref().map(local_time).unwrap_or_default()
            ]);
        }
        table.printstd();

        Ok(())
    }

    /// Key/value table for a single job, including its site details.
    pub fn job(job: &Job) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", job.id]);
        table.add_row(row!["TITLE", job.title]);
        table.add_row(row!["REFERENCE", job.reference.as_deref().unwrap_or_default()]);
        table.add_row(row!["STATUS", job.status]);
        table.add_row(row!["PRIORITY", job.priority]);
        if let Some(site) = &job.site {
            table.add_row(row!["ADDRESS", site.address.as_deref().unwrap_or_default()]);
            table.add_row(row!["CONTACT", site.contact_name.as_deref().unwrap_or_default()]);
            table.add_row(row!["PHONE", site.contact_phone.as_deref().unwrap_or_default()]);
            table.add_row(row!["SCHEDULE", site.schedule_note.as_deref().unwrap_or_default()]);
        }
        table.add_row(row!["CREATED", local_time(&job.created_at)]);
        table.add_row(row!["UPDATED", local_time(&job.updated_at)]);
        if let Some(archived_at) = &job.archived_at {
            table.add_row(row!["ARCHIVED", local_time(archived_at)]);
        }
        table.printstd();

        Ok(())
    }

    pub fn job_items(items: &[JobItem]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["#", "ID", "TYPE", "TITLE", "URGENCY", "STATE", "QTY", "REMINDER"]);
        for (position, item) in items.iter().enumerate() {
            table.add_row(row![
                position + 1,
                short_id(&item.id),
                item.item_type,
                item.title,
                item.urgency,
                item.state,
                quantity(item),
                item.reminder_at.as_ref().map(local_time).unwrap_or_default()
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn inventory(items: &[InventoryItem]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "NAME", "LEVEL", "STORE", "TAGS"]);
        for item in items {
            table.add_row(row![
                short_id(&item.id),
                item.name,
                item.level,
                item.default_store.as_deref().unwrap_or_default(),
                item.tags.join(", ")
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn events(events: &[EventLog]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["TIMESTAMP", "ENTITY", "ENTITY ID", "ACTION", "META"]);
        for event in events {
            table.add_row(row![
                format_timestamp(&event.timestamp),
                event.entity_type,
                short_id(&event.entity_id),
                event.action,
                event.meta
            ]);
        }
        table.printstd();

        Ok(())
    }

    /// Urgent or due entries with the title of their job.
    pub fn today(entries: &[TodayEntry]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "JOB", "TYPE", "TITLE", "REMINDER"]);
        for entry in entries {
            table.add_row(row![
                short_id(&entry.item.id),
                entry.job.as_ref().map(|job| job.title.as_str()).unwrap_or("-"),
                entry.item.item_type,
                entry.item.title,
                entry.item.reminder_at.as_ref().map(local_time).unwrap_or_default()
            ]);
        }
        table.printstd();

        Ok(())
    }
}

/// First eight characters of a UUID, enough to tell rows apart on screen.
fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn local_time(instant: &DateTime<Utc>) -> String {
    instant.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string()
}

fn quantity(item: &JobItem) -> String {
    match &item.quantity {
        Some(quantity) => match &quantity.unit {
            Some(unit) => format!("{} {}", quantity.amount, unit),
            None => quantity.amount.to_string(),
        },
        None => String::new(),
    }
}
