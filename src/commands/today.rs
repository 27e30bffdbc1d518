use crate::{
    db::{db::Db, today::Today},
    libs::{config::Config, messages::Message, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use chrono::Local;
use clap::Args;

#[derive(Debug, Args)]
pub struct TodayArgs {
    /// Maximum number of urgent items
    #[arg(long)]
    urgent: Option<usize>,
    /// Maximum number of due items
    #[arg(long)]
    due: Option<usize>,
}

pub fn cmd(args: TodayArgs) -> Result<()> {
    let mut limits = Config::read()?.today_limits();
    if let Some(urgent) = args.urgent {
        limits.limit_urgent = urgent;
    }
    if let Some(due) = args.due {
        limits.limit_due = due;
    }

    let snapshot = Today::new(&Db::new()?).snapshot(limits)?;
    let now = snapshot.now.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string();
    msg_print!(Message::TodayHeader(now), true);

    if snapshot.urgent.is_empty() && snapshot.due.is_empty() {
        msg_info!(Message::TodayNothing);
        return Ok(());
    }

    if !snapshot.urgent.is_empty() {
        msg_print!(Message::TodayUrgentHeader(snapshot.urgent.len()));
        View::today(&snapshot.urgent)?;
    }
    if !snapshot.due.is_empty() {
        msg_print!(Message::TodayDueHeader(snapshot.due.len()));
        View::today(&snapshot.due)?;
    }

    Ok(())
}
