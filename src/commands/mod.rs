//! Command-line front end.
//!
//! Each subcommand lives in its own module with an `Args` struct and a
//! `cmd` function. Commands open the store, call the repositories and
//! render results; all rules are enforced below them.

pub mod backup;
pub mod init;
pub mod inv;
pub mod item;
pub mod job;
pub mod log;
pub mod migrations;
pub mod today;

use crate::db::db::{Db, Entity};
use crate::libs::messages::Message;
use crate::msg_error_anyhow;
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Manage jobs", arg_required_else_help = true)]
    Job(job::JobArgs),
    #[command(about = "Manage the items of a job", arg_required_else_help = true)]
    Item(item::ItemArgs),
    #[command(about = "Manage the supply inventory", arg_required_else_help = true)]
    Inv(inv::InvArgs),
    #[command(about = "Show urgent and due items")]
    Today(today::TodayArgs),
    #[command(about = "Show the audit log")]
    Log(log::LogArgs),
    #[command(about = "Export or import a full backup", arg_required_else_help = true)]
    Backup(backup::BackupArgs),
    #[command(about = "Inspect database migrations", arg_required_else_help = true)]
    Migrations(migrations::MigrationsArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Job(args) => job::cmd(args),
            Commands::Item(args) => item::cmd(args),
            Commands::Inv(args) => inv::cmd(args),
            Commands::Today(args) => today::cmd(args),
            Commands::Log(args) => log::cmd(args),
            Commands::Backup(args) => backup::cmd(args),
            Commands::Migrations(args) => migrations::cmd(args),
        }
    }
}

/// Finds a record by full id or by an unambiguous id prefix.
pub(crate) fn resolve<E: Entity>(db: &Db, id: &str) -> Result<E> {
    if let Some(entity) = db.get::<E>(id)? {
        return Ok(entity);
    }

    let mut matches = db.find_by_id_prefix::<E>(id, 2)?;
    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(msg_error_anyhow!(Message::RecordNotFound(E::SCHEMA.table.to_string(), id.to_string()))),
        _ => Err(msg_error_anyhow!(Message::AmbiguousId(id.to_string()))),
    }
}
