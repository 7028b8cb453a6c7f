//! `generate`: run a directory search, show the results through the lead
//! table, and optionally save or export the filtered set.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Args;
use leadbaze_client::{BackendClient, GenerationRequest, GeneratorClient};
use leadbaze_core::{write_leads_csv, AppConfig, Lead, NewLeadList, Quota};
use uuid::Uuid;

use super::filters::FilterArgs;
use super::render::render_lead_page;
use super::require_user_id;

#[derive(Debug, Clone, PartialEq, Args)]
pub(crate) struct GenerateArgs {
    /// Kind of business to search for (e.g. "padaria")
    #[arg(long)]
    pub business_type: String,
    /// City and state to search in (e.g. "Curitiba, PR")
    #[arg(long)]
    pub location: String,
    /// Number of leads to request
    #[arg(long, default_value_t = 50)]
    pub quantity: u32,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Hide leads whose phone is already saved in any of your lists
    #[arg(long)]
    pub skip_known: bool,
    /// Save the filtered leads into an existing list
    #[arg(long, conflicts_with = "new_list")]
    pub save_to: Option<Uuid>,
    /// Save the filtered leads into a new list with this name
    #[arg(long)]
    pub new_list: Option<String>,
    /// Write the filtered leads to a CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// Runs a search and routes the results.
///
/// The quota check happens before the request so an exhausted plan does not
/// burn a generator call.
///
/// # Errors
///
/// Returns an error if the generator is not configured, the quota is
/// exhausted, the search fails, or saving/exporting fails.
pub(crate) async fn run_generate(config: &AppConfig, args: GenerateArgs) -> anyhow::Result<()> {
    let generator = GeneratorClient::from_config(config)?;
    let backend = BackendClient::from_config(config)?;
    let user_id = config.user_id.as_deref().filter(|id| !id.trim().is_empty());

    if let Some(user_id) = user_id {
        let snapshot = backend.usage_snapshot(user_id).await?;
        snapshot.check_consume(Quota::Leads, args.quantity)?;
    } else {
        tracing::debug!("no user id configured, skipping quota check");
    }

    let request = GenerationRequest {
        business_type: args.business_type.clone(),
        location: args.location.clone(),
        quantity: args.quantity,
    };
    let result = generator.generate(&request).await?;
    if result.demo_mode {
        println!("note: the generator returned demo data; these leads are samples");
    }

    let mut leads = result.leads;
    if args.skip_known {
        let outcome = backend
            .filter_known_leads(require_user_id(config)?, leads)
            .await?;
        if !outcome.duplicate_leads.is_empty() {
            println!(
                "skipped {} leads already saved in your lists",
                outcome.duplicate_leads.len()
            );
        }
        leads = outcome.new_leads;
    }

    let mut table = args.filters.into_table(leads, config.page_size)?;
    println!("{}", render_lead_page(&table.view()));

    let wants_output = args.save_to.is_some() || args.new_list.is_some() || args.csv.is_some();
    if !wants_output {
        return Ok(());
    }

    table.select_all_filtered();
    let chosen: Vec<Lead> = table.selected_leads().into_iter().cloned().collect();
    if chosen.is_empty() {
        println!("nothing to save: no leads match the current filters");
        return Ok(());
    }

    if let Some(path) = &args.csv {
        write_leads_csv(BufWriter::new(File::create(path)?), &chosen)?;
        println!("wrote {} leads to {}", chosen.len(), path.display());
    }

    let target = match (&args.save_to, &args.new_list) {
        (Some(id), _) => Some(*id),
        (None, Some(name)) => {
            let list = backend
                .create_lead_list(
                    require_user_id(config)?,
                    &NewLeadList {
                        name: name.clone(),
                        description: Some(format!("{} in {}", args.business_type, args.location)),
                        tags: vec![args.business_type.trim().to_lowercase()],
                    },
                )
                .await?;
            println!("created list \"{}\" ({})", list.name, list.id);
            Some(list.id)
        }
        (None, None) => None,
    };

    if let Some(list_id) = target {
        let outcome = backend.add_leads_to_list(list_id, chosen).await?;
        println!(
            "saved {} new leads, skipped {} duplicates",
            outcome.new_leads.len(),
            outcome.duplicate_leads.len()
        );
    }
    Ok(())
}
