use crate::{
    commands::resolve,
    db::{db::Db, job_items::JobItems},
    libs::{
        job::Job,
        job_item::{ItemUrgency, JobItem, JobItemPatch, JobItemType, NewJobItem, Quantity, StoreRef},
        messages::Message,
        view::View,
    },
    msg_bail_anyhow, msg_info, msg_print, msg_success,
};
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Utc};
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct ItemArgs {
    #[command(subcommand)]
    command: ItemCommand,
}

#[derive(Debug, Subcommand)]
enum ItemCommand {
    /// Add an item to a job
    Add {
        /// Job id or id prefix
        job: String,
        /// Item title
        title: String,
        #[arg(short = 't', long = "type", value_enum, default_value = "note")]
        item_type: JobItemType,
        /// Mark the item urgent
        #[arg(short, long)]
        urgent: bool,
        #[arg(short, long)]
        details: Option<String>,
        /// Quantity to buy or use
        #[arg(long)]
        qty: Option<f64>,
        /// Unit for the quantity
        #[arg(long, requires = "qty")]
        unit: Option<String>,
        /// Store to buy from
        #[arg(long)]
        store: Option<String>,
        /// Reminder time: RFC 3339, "YYYY-MM-DD HH:MM" local, or +30m / +4h / +2d
        #[arg(short, long, value_parser = parse_reminder)]
        remind: Option<DateTime<Utc>>,
    },
    /// List the items of a job
    List {
        /// Job id or id prefix
        job: String,
        /// Hide done items
        #[arg(short, long)]
        pending: bool,
    },
    /// Edit an item
    Edit {
        /// Item id or id prefix
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        details: Option<String>,
        #[arg(short, long, value_enum)]
        urgency: Option<ItemUrgency>,
    },
    /// Mark an item done
    Done {
        /// Item id or id prefix
        id: String,
    },
    /// Mark an item pending again
    Undone {
        /// Item id or id prefix
        id: String,
    },
    /// Set or clear the reminder of an item
    Snooze {
        /// Item id or id prefix
        id: String,
        /// Reminder time: RFC 3339, "YYYY-MM-DD HH:MM" local, or +30m / +4h / +2d
        #[arg(value_parser = parse_reminder, required_unless_present = "clear")]
        at: Option<DateTime<Utc>>,
        /// Remove the reminder
        #[arg(long, conflicts_with = "at")]
        clear: bool,
    },
    /// Turn an item into a BUY item
    Convert {
        /// Item id or id prefix
        id: String,
    },
    /// Reorder the items of a job
    Reorder {
        /// Job id or id prefix
        job: String,
        /// Item ids (or prefixes) in the new order
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete an item
    Delete {
        /// Item id or id prefix
        id: String,
    },
}

pub fn cmd(args: ItemArgs) -> Result<()> {
    let db = Db::new()?;
    let items = JobItems::new(&db);

    match args.command {
        ItemCommand::Add {
            job,
            title,
            item_type,
            urgent,
            details,
            qty,
            unit,
            store,
            remind,
        } => {
            let job: Job = resolve(&db, &job)?;
            let mut payload = NewJobItem::new(item_type, &title);
            if urgent {
                payload = payload.urgent();
            }
            payload.details = details;
            payload.quantity = qty.map(|amount| Quantity { amount, unit });
            payload.store = store.map(|name| StoreRef {
                name: Some(name),
                reference: None,
            });
            payload.reminder_at = remind;

            let item = items.create(&job.id, payload)?;
            msg_success!(Message::ItemCreated(item.title));
        }
        ItemCommand::List { job, pending } => {
            let job: Job = resolve(&db, &job)?;
            let list = items.list_by_job(&job.id, !pending)?;
            if list.is_empty() {
                msg_info!(Message::NoItemsForJob(job.title));
                return Ok(());
            }
            msg_print!(Message::JobItemsHeader(job.title), true);
            View::job_items(&list)?;
        }
        ItemCommand::Edit {
            id,
            title,
            details,
            urgency,
        } => {
            let item: JobItem = resolve(&db, &id)?;
            if title.is_none() && details.is_none() && urgency.is_none() {
                msg_info!(Message::NoChangesDetected);
                return Ok(());
            }
            let patch = JobItemPatch {
                title,
                details: details.map(Some),
                urgency,
                ..Default::default()
            };
            let item = items.update(&item.id, patch)?;
            msg_success!(Message::ItemUpdated(item.title));
        }
        ItemCommand::Done { id } => {
            let item: JobItem = resolve(&db, &id)?;
            let item = items.set_done(&item.id, true)?;
            msg_success!(Message::ItemDone(item.title));
        }
        ItemCommand::Undone { id } => {
            let item: JobItem = resolve(&db, &id)?;
            let item = items.set_done(&item.id, false)?;
            msg_success!(Message::ItemUndone(item.title));
        }
        ItemCommand::Snooze { id, at, clear } => {
            let item: JobItem = resolve(&db, &id)?;
            let reminder_at = if clear { None } else { at };
            let item = items.snooze(&item.id, reminder_at)?;
            match item.reminder_at {
                Some(at) => msg_success!(Message::ItemSnoozed(item.title, at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())),
                None => msg_success!(Message::ItemReminderCleared(item.title)),
            }
        }
        ItemCommand::Convert { id } => {
            let item: JobItem = resolve(&db, &id)?;
            let item = items.convert_to_buy(&item.id)?;
            msg_success!(Message::ItemConverted(item.title));
        }
        ItemCommand::Reorder { job, ids } => {
            let job: Job = resolve(&db, &job)?;
            let mut ordered = Vec::with_capacity(ids.len());
            for id in &ids {
                let item: JobItem = resolve(&db, id)?;
                ordered.push(item.id);
            }
            items.reorder(&job.id, &ordered)?;
            msg_success!(Message::ItemsReordered(job.title, ordered.len()));
        }
        ItemCommand::Delete { id } => {
            let item: JobItem = resolve(&db, &id)?;
            items.delete(&item.id)?;
            msg_success!(Message::ItemDeleted(item.title));
        }
    }

    Ok(())
}

/// Parses a reminder time given on the command line.
fn parse_reminder(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Some(offset) = input.strip_prefix('+') {
        let Some(unit) = offset.chars().last() else {
            msg_bail_anyhow!(Message::InvalidReminder(input.to_string()));
        };
        let amount: i64 = offset[..offset.len() - unit.len_utf8()].parse()?;
        let delta = match unit {
            'm' => TimeDelta::try_minutes(amount),
            'h' => TimeDelta::try_hours(amount),
            'd' => TimeDelta::try_days(amount),
            _ => None,
        };
        return match delta.and_then(|delta| Utc::now().checked_add_signed(delta)) {
            Some(instant) => Ok(instant),
            None => msg_bail_anyhow!(Message::InvalidReminder(input.to_string())),
        };
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M")?;
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => Ok(local.with_timezone(&Utc)),
        None => msg_bail_anyhow!(Message::InvalidReminder(input.to_string())),
    }
}
