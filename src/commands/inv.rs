use crate::{
    commands::resolve,
    db::{db::Db, inventory::Inventory},
    libs::{
        inventory_item::{InventoryFilter, InventoryItem, InventoryLevel, InventoryPatch, NewInventoryItem},
        job::Job,
        messages::Message,
        view::View,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct InvArgs {
    #[command(subcommand)]
    command: InvCommand,
}

#[derive(Debug, Subcommand)]
enum InvCommand {
    /// Add a supply
    Add {
        /// Supply name
        name: String,
        #[arg(short, long, value_enum)]
        level: Option<InventoryLevel>,
        /// Store usually bought from
        #[arg(short, long)]
        store: Option<String>,
        /// Tags, comma separated
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// List supplies
    List {
        #[arg(short, long, value_enum)]
        level: Option<InventoryLevel>,
        /// Case-insensitive search in the name
        #[arg(short = 'q', long)]
        search: Option<String>,
    },
    /// Rename a supply
    Rename {
        /// Supply id or id prefix
        id: String,
        name: String,
    },
    /// Set the stock level of a supply
    Level {
        /// Supply id or id prefix
        id: String,
        #[arg(value_enum)]
        level: InventoryLevel,
    },
    /// Fold one supply into another and delete it
    Merge {
        /// Supply that is kept
        target: String,
        /// Supply that is absorbed and deleted
        source: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Add a supply to the shopping list of a job
    Buy {
        /// Supply id or id prefix
        id: String,
        /// Job id or id prefix
        job: String,
        /// Quantity to buy
        #[arg(long)]
        qty: Option<f64>,
    },
}

pub fn cmd(args: InvArgs) -> Result<()> {
    let db = Db::new()?;
    let inventory = Inventory::new(&db);

    match args.command {
        InvCommand::Add { name, level, store, tags } => {
            let item = inventory.create(NewInventoryItem {
                name,
                level,
                default_store: store,
                tags,
            })?;
            msg_success!(Message::InventoryCreated(item.name));
        }
        InvCommand::List { level, search } => {
            let items = inventory.list(&InventoryFilter { level, search })?;
            if items.is_empty() {
                msg_info!(Message::NoInventoryFound);
                return Ok(());
            }
            msg_print!(Message::InventoryListHeader, true);
            View::inventory(&items)?;
        }
        InvCommand::Rename { id, name } => {
            let item: InventoryItem = resolve(&db, &id)?;
            let renamed = inventory.update(
                &item.id,
                InventoryPatch {
                    name: Some(name),
                    ..Default::default()
                },
            )?;
            msg_success!(Message::InventoryRenamed(item.name, renamed.name));
        }
        InvCommand::Level { id, level } => {
            let item: InventoryItem = resolve(&db, &id)?;
            let item = inventory.set_level(&item.id, level)?;
            msg_success!(Message::InventoryLevelChanged(item.name, level.to_string()));
        }
        InvCommand::Merge { target, source, yes } => {
            let target: InventoryItem = resolve(&db, &target)?;
            let source: InventoryItem = resolve(&db, &source)?;

            let confirmed = yes
                || Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(Message::ConfirmMerge(source.name.clone(), target.name.clone()).to_string())
                    .default(false)
                    .interact()?;
            if !confirmed {
                msg_info!(Message::OperationCancelled);
                return Ok(());
            }

            let merged = inventory.merge(&target.id, &source.id)?;
            msg_success!(Message::InventoryMerged(source.name, merged.name));
        }
        InvCommand::Buy { id, job, qty } => {
            let item: InventoryItem = resolve(&db, &id)?;
            let job: Job = resolve(&db, &job)?;
            inventory.add_to_purchases(&item.id, &job.id, qty)?;
            msg_success!(Message::InventoryAddedToPurchases(item.name, job.title));
        }
    }

    Ok(())
}
