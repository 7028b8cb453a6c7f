//! `lists`: browse, create, archive, delete and export saved lead lists.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Subcommand;
use leadbaze_client::BackendClient;
use leadbaze_core::{write_leads_csv, AppConfig, Lead, ListStatus, NewLeadList};
use uuid::Uuid;

use super::filters::FilterArgs;
use super::render::{render_lead_page, render_lists};
use super::require_user_id;
use crate::dialog::dialog_for;

/// Sub-commands available under `lists`.
#[derive(Debug, Subcommand)]
pub(crate) enum ListsCommands {
    /// Show your lead lists, newest first
    Ls {
        /// Include archived lists
        #[arg(long)]
        all: bool,
    },
    /// Show the leads in a list
    Show {
        id: Uuid,
        #[command(flatten)]
        filters: FilterArgs,
        /// Print the current page as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create an empty list
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Tag to attach; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Delete a list and its leads
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Hide a list from the default listing
    Archive { id: Uuid },
    /// Bring an archived list back
    Restore { id: Uuid },
    /// Write a list's leads to a CSV file
    Export {
        id: Uuid,
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// # Errors
///
/// Returns an error if the backend call fails, the user id is missing for
/// per-user commands, or the export file cannot be written.
pub(crate) async fn run_lists(config: &AppConfig, command: ListsCommands) -> anyhow::Result<()> {
    let backend = BackendClient::from_config(config)?;

    match command {
        ListsCommands::Ls { all } => {
            let lists = backend.list_lead_lists(require_user_id(config)?).await?;
            let shown: Vec<_> = lists
                .into_iter()
                .filter(|l| all || l.status == ListStatus::Active)
                .collect();
            if shown.is_empty() {
                println!("no lead lists yet; save some with `generate --new-list`");
            } else {
                println!("{}", render_lists(&shown));
            }
        }
        ListsCommands::Show { id, filters, json } => {
            let list = backend.get_lead_list(id).await?;
            println!("{} ({}, {} leads)", list.name, list.status, list.total_leads);
            let table = filters.into_table(list.leads, config.page_size)?;
            let view = table.view();
            if json {
                println!("{}", serde_json::to_string_pretty(&view.items)?);
            } else {
                println!("{}", render_lead_page(&view));
            }
        }
        ListsCommands::Create {
            name,
            description,
            tags,
        } => {
            let list = backend
                .create_lead_list(
                    require_user_id(config)?,
                    &NewLeadList {
                        name,
                        description,
                        tags,
                    },
                )
                .await?;
            println!("created list \"{}\" ({})", list.name, list.id);
        }
        ListsCommands::Delete { id, yes } => {
            let list = backend.get_lead_list(id).await?;
            let prompt = format!(
                "Delete \"{}\" and its {} leads? This cannot be undone.",
                list.name, list.total_leads
            );
            if !dialog_for(yes).confirm(&prompt)?.is_accepted() {
                println!("cancelled");
                return Ok(());
            }
            backend.delete_lead_list(id).await?;
            println!("deleted list \"{}\"", list.name);
        }
        ListsCommands::Archive { id } => {
            backend.set_list_status(id, ListStatus::Archived).await?;
            println!("archived list {id}");
        }
        ListsCommands::Restore { id } => {
            backend.set_list_status(id, ListStatus::Active).await?;
            println!("restored list {id}");
        }
        ListsCommands::Export { id, out, filters } => {
            let list = backend.get_lead_list(id).await?;
            let table = filters.into_table(list.leads, config.page_size)?;
            let rows: Vec<Lead> = table.filtered().into_iter().cloned().collect();
            write_leads_csv(BufWriter::new(File::create(&out)?), &rows)?;
            println!("wrote {} leads to {}", rows.len(), out.display());
        }
    }
    Ok(())
}
