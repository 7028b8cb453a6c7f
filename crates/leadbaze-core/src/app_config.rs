use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Base URL of the Supabase project, e.g. `https://abc.supabase.co`.
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// User session token. Requests fall back to the anon key when unset.
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    /// n8n webhook that runs the directory search.
    pub generator_url: Option<String>,
    pub generator_max_quantity: u32,
    pub evolution_api_url: Option<String>,
    pub evolution_api_key: Option<String>,
    pub kommo_client_id: Option<String>,
    pub kommo_redirect_uri: Option<String>,
    pub http_timeout_secs: u64,
    pub http_user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub poll_interval_ms: u64,
    pub qr_max_attempts: u32,
    pub page_size: usize,
    pub oauth_callback_addr: SocketAddr,
    pub oauth_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"[redacted]")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("user_id", &self.user_id)
            .field("generator_url", &self.generator_url)
            .field("generator_max_quantity", &self.generator_max_quantity)
            .field("evolution_api_url", &self.evolution_api_url)
            .field(
                "evolution_api_key",
                &self.evolution_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("kommo_client_id", &self.kommo_client_id)
            .field("kommo_redirect_uri", &self.kommo_redirect_uri)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("qr_max_attempts", &self.qr_max_attempts)
            .field("page_size", &self.page_size)
            .field("oauth_callback_addr", &self.oauth_callback_addr)
            .field("oauth_timeout_secs", &self.oauth_timeout_secs)
            .finish()
    }
}
