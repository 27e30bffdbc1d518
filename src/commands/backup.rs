use crate::{
    db::db::Db,
    libs::{backup::Backup, messages::Message},
    msg_info, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct BackupArgs {
    #[command(subcommand)]
    command: BackupCommand,
}

#[derive(Debug, Subcommand)]
enum BackupCommand {
    /// Write every record to a JSON file
    Export {
        /// Output file
        path: PathBuf,
    },
    /// Load a JSON backup into the database
    Import {
        /// Backup file
        path: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn cmd(args: BackupArgs) -> Result<()> {
    let db = Db::new()?;

    match args.command {
        BackupCommand::Export { path } => {
            let backup = Backup::export(&db)?;
            backup.write_to(&path)?;
            msg_success!(Message::BackupWritten(
                path.display().to_string(),
                backup.data.jobs.len(),
                backup.data.event_logs.len()
            ));
        }
        BackupCommand::Import { path, yes } => {
            let backup = Backup::read_from(&path)?;

            let confirmed = yes
                || Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(Message::ConfirmImport(path.display().to_string(), backup.app.build.clone()).to_string())
                    .default(false)
                    .interact()?;
            if !confirmed {
                msg_info!(Message::OperationCancelled);
                return Ok(());
            }

            let report = Backup::restore(&db, &backup)?;
            msg_success!(Message::BackupImported(
                report.jobs,
                report.job_items,
                report.inventory_items,
                report.event_logs
            ));
        }
    }

    Ok(())
}
