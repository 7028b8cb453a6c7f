//! Kommo CRM OAuth helpers.
//!
//! The authorization code exchange happens server side (see
//! [`crate::BackendClient::connect_kommo`]); this module only builds the
//! authorize URL, validates the account subdomain and generates the CSRF
//! state value.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

const AUTHORIZE_URL: &str = "https://www.kommo.com/oauth";

/// Payload sent to the backend once Kommo redirects back with a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KommoConnect {
    pub code: String,
    pub subdomain: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KommoConnection {
    pub subdomain: String,
    #[serde(default)]
    pub account_id: Option<i64>,
    #[serde(default)]
    pub connected: bool,
}

/// Builds the Kommo consent page URL for `client_id`.
///
/// # Errors
///
/// Returns [`ClientError::InvalidInput`] if `client_id` or `state` is blank.
pub fn authorize_url(
    client_id: &str,
    state: &str,
    redirect_uri: Option<&str>,
) -> Result<Url, ClientError> {
    if client_id.trim().is_empty() {
        return Err(ClientError::InvalidInput(
            "Kommo client id must not be empty".to_owned(),
        ));
    }
    if state.trim().is_empty() {
        return Err(ClientError::InvalidInput(
            "OAuth state must not be empty".to_owned(),
        ));
    }
    let mut url = Url::parse(AUTHORIZE_URL).map_err(|e| ClientError::InvalidBaseUrl {
        url: AUTHORIZE_URL.to_owned(),
        reason: e.to_string(),
    })?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("client_id", client_id.trim())
            .append_pair("state", state)
            .append_pair("mode", "post_message");
        if let Some(redirect) = redirect_uri.filter(|r| !r.trim().is_empty()) {
            pairs.append_pair("redirect_uri", redirect.trim());
        }
    }
    Ok(url)
}

/// Normalizes a Kommo account subdomain.
///
/// Accepts either the bare subdomain (`minhaempresa`) or the full host
/// (`minhaempresa.kommo.com`, with or without scheme) and returns the
/// lowercase subdomain.
///
/// # Errors
///
/// Returns [`ClientError::InvalidInput`] if the result is empty, starts or
/// ends with a hyphen, or contains anything other than ASCII letters,
/// digits and hyphens.
pub fn validate_subdomain(raw: &str) -> Result<String, ClientError> {
    let lowered = raw.trim().to_ascii_lowercase();
    let host = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered)
        .trim_end_matches('/');
    let sub = host.strip_suffix(".kommo.com").unwrap_or(host);

    let valid = !sub.is_empty()
        && !sub.starts_with('-')
        && !sub.ends_with('-')
        && sub
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(sub.to_owned())
    } else {
        Err(ClientError::InvalidInput(format!(
            "invalid Kommo subdomain \"{}\"",
            raw.trim()
        )))
    }
}

/// Random 128-bit state token, hex encoded.
#[must_use]
pub fn generate_state() -> String {
    format!("{:032x}", rand::random::<u128>())
}
