use thiserror::Error;

use crate::usage::Quota;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid value {value:?} for filter {field}")]
    InvalidFilter { field: &'static str, value: String },

    #[error("{quota} quota exceeded: requested {requested}, remaining {remaining}")]
    QuotaExceeded {
        quota: Quota,
        requested: u32,
        remaining: u32,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading [`crate::AppConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
