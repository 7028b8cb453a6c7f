//! `kommo connect`: OAuth authorization of a Kommo CRM account.

use std::time::Duration;

use clap::Subcommand;
use leadbaze_client::{
    authorize_url, generate_state, validate_subdomain, BackendClient, ClientError, KommoConnect,
};
use leadbaze_core::AppConfig;

use super::require_user_id;
use crate::oauth_callback::{wait_for_callback, CallbackEvent};

#[derive(Debug, Subcommand)]
pub(crate) enum KommoCommands {
    /// Authorize LeadBaze in Kommo and store the connection
    Connect {
        /// Account subdomain, e.g. "minhaempresa" or "minhaempresa.kommo.com"
        #[arg(long)]
        subdomain: String,
    },
}

/// # Errors
///
/// Returns an error if Kommo is not configured, the subdomain is invalid,
/// authorization is denied or times out, or the code exchange fails.
pub(crate) async fn run_kommo(config: &AppConfig, command: KommoCommands) -> anyhow::Result<()> {
    match command {
        KommoCommands::Connect { subdomain } => connect(config, &subdomain).await,
    }
}

async fn connect(config: &AppConfig, subdomain: &str) -> anyhow::Result<()> {
    let subdomain = validate_subdomain(subdomain)?;
    let user_id = require_user_id(config)?;
    let client_id = config
        .kommo_client_id
        .as_deref()
        .ok_or(ClientError::MissingConfig("KOMMO_CLIENT_ID"))?;
    let redirect_uri = config
        .kommo_redirect_uri
        .clone()
        .unwrap_or_else(|| format!("http://{}/callback", config.oauth_callback_addr));

    let state = generate_state();
    let url = authorize_url(client_id, &state, Some(&redirect_uri))?;
    println!("open this URL to authorize LeadBaze in Kommo:\n{url}");

    let event = wait_for_callback(
        config.oauth_callback_addr,
        &state,
        Duration::from_secs(config.oauth_timeout_secs),
    )
    .await?;
    let code = match event {
        CallbackEvent::Code(code) => code,
        CallbackEvent::Denied(reason) => anyhow::bail!("Kommo authorization denied: {reason}"),
    };

    let backend = BackendClient::from_config(config)?;
    let connection = backend
        .connect_kommo(&KommoConnect {
            code,
            subdomain,
            user_id: user_id.to_owned(),
        })
        .await?;
    match connection.account_id {
        Some(account_id) => println!(
            "connected Kommo account {} (id {account_id})",
            connection.subdomain
        ),
        None => println!("connected Kommo account {}", connection.subdomain),
    }
    Ok(())
}
