use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let supabase_url = require("SUPABASE_URL")?;
    let supabase_anon_key = require("SUPABASE_ANON_KEY")?;

    let env = parse_environment(&or_default("LEADBAZE_ENV", "development"))?;
    let log_level = or_default("LEADBAZE_LOG_LEVEL", "info");

    let access_token = optional("LEADBAZE_ACCESS_TOKEN");
    let user_id = optional("LEADBAZE_USER_ID");

    let generator_url = optional("LEADBAZE_GENERATOR_URL");
    let generator_max_quantity = parse_u32("LEADBAZE_GENERATOR_MAX_QUANTITY", "500")?;

    let evolution_api_url = optional("EVOLUTION_API_URL");
    let evolution_api_key = optional("EVOLUTION_API_KEY");

    let kommo_client_id = optional("KOMMO_CLIENT_ID");
    let kommo_redirect_uri = optional("KOMMO_REDIRECT_URI");

    let http_timeout_secs = parse_u64("LEADBAZE_HTTP_TIMEOUT_SECS", "30")?;
    let http_user_agent = or_default("LEADBAZE_HTTP_USER_AGENT", "leadbaze/0.1 (lead-toolkit)");
    let max_retries = parse_u32("LEADBAZE_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("LEADBAZE_RETRY_BACKOFF_BASE_MS", "500")?;
    let poll_interval_ms = parse_u64("LEADBAZE_POLL_INTERVAL_MS", "2000")?;
    let qr_max_attempts = parse_u32("LEADBAZE_QR_MAX_ATTEMPTS", "30")?;

    let page_size = parse_usize("LEADBAZE_PAGE_SIZE", "10")?;
    if page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LEADBAZE_PAGE_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let oauth_callback_addr = parse_addr("LEADBAZE_OAUTH_CALLBACK_ADDR", "127.0.0.1:8910")?;
    let oauth_timeout_secs = parse_u64("LEADBAZE_OAUTH_TIMEOUT_SECS", "300")?;

    Ok(AppConfig {
        env,
        log_level,
        supabase_url,
        supabase_anon_key,
        access_token,
        user_id,
        generator_url,
        generator_max_quantity,
        evolution_api_url,
        evolution_api_key,
        kommo_client_id,
        kommo_redirect_uri,
        http_timeout_secs,
        http_user_agent,
        max_retries,
        retry_backoff_base_ms,
        poll_interval_ms,
        qr_max_attempts,
        page_size,
        oauth_callback_addr,
        oauth_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADBAZE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
