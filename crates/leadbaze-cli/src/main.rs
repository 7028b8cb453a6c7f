mod commands;
mod dialog;
mod oauth_callback;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{
    campaign::CampaignCommands, generate::GenerateArgs, kommo::KommoCommands,
    lists::ListsCommands, whatsapp::WhatsappCommands,
};

#[derive(Debug, Parser)]
#[command(name = "leadbaze")]
#[command(about = "LeadBaze lead generation and campaign toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search a business directory for new leads
    Generate(GenerateArgs),
    /// Manage saved lead lists
    Lists {
        #[command(subcommand)]
        command: ListsCommands,
    },
    /// Follow a running campaign
    Campaign {
        #[command(subcommand)]
        command: CampaignCommands,
    },
    /// Connect and manage the WhatsApp number used for campaigns
    Whatsapp {
        #[command(subcommand)]
        command: WhatsappCommands,
    },
    /// Kommo CRM integration
    Kommo {
        #[command(subcommand)]
        command: KommoCommands,
    },
    /// Show plan limits and consumption for the current billing period
    Usage,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = leadbaze_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Generate(args) => commands::generate::run_generate(&config, args).await,
        Commands::Lists { command } => commands::lists::run_lists(&config, command).await,
        Commands::Campaign { command } => commands::campaign::run_campaign(&config, command).await,
        Commands::Whatsapp { command } => commands::whatsapp::run_whatsapp(&config, command).await,
        Commands::Kommo { command } => commands::kommo::run_kommo(&config, command).await,
        Commands::Usage => commands::usage::run_usage(&config).await,
    }
}
