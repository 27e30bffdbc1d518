use crate::{
    db::{db::Db, event_logs::EventLogs},
    libs::{config::Config, event_log::EntityType, event_log::EventFilter, messages::Message, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Only records of this entity type
    #[arg(short = 't', long = "type", value_enum)]
    entity_type: Option<EntityType>,
    /// Only records of this entity id
    #[arg(short, long)]
    id: Option<String>,
    /// Maximum number of records, most recent first
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

pub fn cmd(args: LogArgs) -> Result<()> {
    let limit = match args.limit {
        Some(limit) => limit,
        None => Config::read()?.event_limit(),
    };

    let events = EventLogs::new(&Db::new()?).list(&EventFilter {
        entity_type: args.entity_type,
        entity_id: args.id,
        limit,
    })?;

    if events.is_empty() {
        msg_info!(Message::NoEventsFound);
        return Ok(());
    }

    msg_print!(Message::EventLogHeader(events.len()), true);
    View::events(&events)?;
    Ok(())
}
