//! Command handlers for the CLI. Each submodule owns its clap types and a
//! `run_*` entry point called from `main`.

pub(crate) mod campaign;
pub(crate) mod filters;
pub(crate) mod generate;
pub(crate) mod kommo;
pub(crate) mod lists;
mod render;
pub(crate) mod usage;
pub(crate) mod whatsapp;

use leadbaze_core::AppConfig;

/// Commands that read or write per-user data need a user id.
pub(crate) fn require_user_id(config: &AppConfig) -> anyhow::Result<&str> {
    config
        .user_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("LEADBAZE_USER_ID is not set; sign in and export it first"))
}
