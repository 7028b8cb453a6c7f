use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("SUPABASE_URL", "https://project.supabase.co");
    m.insert("SUPABASE_ANON_KEY", "anon-key");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "LEADBAZE_ENV"));
}

#[test]
fn build_app_config_fails_without_supabase_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SUPABASE_URL"),
        "expected MissingEnvVar(SUPABASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_anon_key() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("SUPABASE_URL", "https://project.supabase.co");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SUPABASE_ANON_KEY"),
        "expected MissingEnvVar(SUPABASE_ANON_KEY), got: {result:?}"
    );
}

#[test]
fn blank_required_var_counts_as_missing() {
    let mut map = full_env();
    map.insert("SUPABASE_ANON_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SUPABASE_ANON_KEY"));
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.supabase_url, "https://project.supabase.co");
    assert!(cfg.access_token.is_none());
    assert!(cfg.user_id.is_none());
    assert!(cfg.generator_url.is_none());
    assert_eq!(cfg.generator_max_quantity, 500);
    assert!(cfg.evolution_api_url.is_none());
    assert_eq!(cfg.http_timeout_secs, 30);
    assert_eq!(cfg.http_user_agent, "leadbaze/0.1 (lead-toolkit)");
    assert_eq!(cfg.max_retries, 3);
    assert_eq!(cfg.retry_backoff_base_ms, 500);
    assert_eq!(cfg.poll_interval_ms, 2000);
    assert_eq!(cfg.qr_max_attempts, 30);
    assert_eq!(cfg.page_size, 10);
    assert_eq!(cfg.oauth_callback_addr.to_string(), "127.0.0.1:8910");
    assert_eq!(cfg.oauth_timeout_secs, 300);
}

#[test]
fn optional_integrations_are_read_when_present() {
    let mut map = full_env();
    map.insert("LEADBAZE_GENERATOR_URL", "https://n8n.example.com/webhook/leads");
    map.insert("EVOLUTION_API_URL", "https://evo.example.com");
    map.insert("EVOLUTION_API_KEY", "evo-key");
    map.insert("KOMMO_CLIENT_ID", "client-123");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.generator_url.as_deref(),
        Some("https://n8n.example.com/webhook/leads")
    );
    assert_eq!(cfg.evolution_api_url.as_deref(), Some("https://evo.example.com"));
    assert_eq!(cfg.evolution_api_key.as_deref(), Some("evo-key"));
    assert_eq!(cfg.kommo_client_id.as_deref(), Some("client-123"));
}

#[test]
fn invalid_qr_max_attempts_is_rejected() {
    let mut map = full_env();
    map.insert("LEADBAZE_QR_MAX_ATTEMPTS", "thirty");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LEADBAZE_QR_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(LEADBAZE_QR_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn poll_interval_override() {
    let mut map = full_env();
    map.insert("LEADBAZE_POLL_INTERVAL_MS", "750");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.poll_interval_ms, 750);
}

#[test]
fn zero_page_size_is_rejected() {
    let mut map = full_env();
    map.insert("LEADBAZE_PAGE_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LEADBAZE_PAGE_SIZE"),
        "expected InvalidEnvVar(LEADBAZE_PAGE_SIZE), got: {result:?}"
    );
}

#[test]
fn invalid_callback_addr_is_rejected() {
    let mut map = full_env();
    map.insert("LEADBAZE_OAUTH_CALLBACK_ADDR", "localhost");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LEADBAZE_OAUTH_CALLBACK_ADDR"),
        "expected InvalidEnvVar(LEADBAZE_OAUTH_CALLBACK_ADDR), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = full_env();
    map.insert("LEADBAZE_ACCESS_TOKEN", "very-secret-token");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("anon-key"));
    assert!(!rendered.contains("very-secret-token"));
    assert!(rendered.contains("[redacted]"));
}
