use thiserror::Error;

/// Errors returned by the LeadBaze service clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("not authorized for {url}; check the API key or session token")]
    Unauthorized { url: String },

    #[error("not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// The QR code never became available within the polling budget.
    #[error("QR code not available after {attempts} attempts, try again")]
    QrCodeUnavailable { attempts: u32 },

    #[error(transparent)]
    Core(#[from] leadbaze_core::CoreError),
}
