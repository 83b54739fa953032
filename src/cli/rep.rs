use anyhow::Result;
use clap::Subcommand;

use crate::store::{
    entities::RepRole,
    entry_store::EntryStore,
    roster::FsRosterStore,
};

#[derive(Debug, Subcommand)]
pub enum RepCommand {
    #[command(about = "Add a rep to the roster")]
    Add {
        name: String,
        #[arg(long, help = "Register as a manager instead of a contributor")]
        manager: bool,
    },
    #[command(about = "Remove a rep and every entry they logged")]
    Remove { name: String },
    #[command(about = "List the roster")]
    List {},
}

pub async fn process_rep_command(
    command: RepCommand,
    roster: &FsRosterStore,
    store: &impl EntryStore,
) -> Result<()> {
    match command {
        RepCommand::Add { name, manager } => {
            let role = if manager {
                RepRole::Manager
            } else {
                RepRole::Contributor
            };
            let rep = roster.add(&name, role).await?;
            println!("Added {} ({})", rep.name, rep.role);
        }
        RepCommand::Remove { name } => match roster.remove(&name).await? {
            Some(rep) => {
                store.delete_entries_for(rep.id).await?;
                println!("Removed {} and their entries", rep.name);
            }
            None => println!("No rep named {name}"),
        },
        RepCommand::List {} => {
            for rep in roster.list().await? {
                println!("{}\t{}\t{}", rep.name, rep.role, rep.id);
            }
        }
    }
    Ok(())
}
