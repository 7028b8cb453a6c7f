//! Client for the Evolution API, which hosts the WhatsApp sessions used to
//! send campaigns.
//!
//! Connecting a number is a three step flow: create an instance, show the QR
//! code (or a pairing code) to the user, then poll the connection state until
//! it reports `open`.

use std::time::Duration;

use leadbaze_core::AppConfig;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::MissedTickBehavior;

use crate::error::ClientError;
use crate::http::{build_http_client, check_status, endpoint, parse_base_url, read_json};
use crate::poll::{poll_resource, PollOptions, PollSubscription};
use crate::retry::{is_retriable, retry_with_backoff};

const INTEGRATION: &str = "WHATSAPP-BAILEYS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCode {
    /// Data URL (`data:image/png;base64,...`) of the QR image.
    #[serde(default)]
    pub base64: Option<String>,
    /// Raw QR payload, for rendering in a terminal.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, rename = "pairingCode")]
    pub pairing_code: Option<String>,
}

impl QrCode {
    fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.base64) && blank(&self.code) && blank(&self.pairing_code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Connecting,
    Close,
    Unknown,
}

impl ConnectionState {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" | "connected" => Self::Open,
            "connecting" => Self::Connecting,
            "close" | "closed" | "disconnected" => Self::Close,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn is_connected(self) -> bool {
        self == Self::Open
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Close => write!(f, "close"),
            ConnectionState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Instance details returned on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    pub instance_name: String,
    pub instance_id: Option<String>,
    pub status: Option<String>,
    /// Some Evolution versions return the first QR code inline.
    pub qr: Option<QrCode>,
}

#[derive(Deserialize)]
struct CreateResponse {
    instance: CreateInstance,
    #[serde(default)]
    qrcode: Option<QrCode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateInstance {
    instance_name: String,
    #[serde(default)]
    instance_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
struct StateResponse {
    instance: StateInstance,
}

#[derive(Deserialize)]
struct StateInstance {
    #[serde(default)]
    state: String,
}

#[derive(Clone)]
pub struct WhatsappClient {
    client: Client,
    base_url: Url,
    api_key: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for WhatsappClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsappClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl WhatsappClient {
    /// # Errors
    ///
    /// - [`ClientError::MissingConfig`] if `EVOLUTION_API_URL` or
    ///   `EVOLUTION_API_KEY` is unset.
    /// - [`ClientError::InvalidBaseUrl`] for a malformed URL.
    /// - [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        let url = config
            .evolution_api_url
            .as_deref()
            .ok_or(ClientError::MissingConfig("EVOLUTION_API_URL"))?;
        let key = config
            .evolution_api_key
            .as_deref()
            .ok_or(ClientError::MissingConfig("EVOLUTION_API_KEY"))?;
        Ok(Self {
            client: build_http_client(config.http_timeout_secs, &config.http_user_agent)?,
            base_url: parse_base_url(url)?,
            api_key: key.to_owned(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    /// Creates a client against an arbitrary base URL with retries disabled
    /// (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`WhatsappClient::from_config`].
    pub fn with_base_url(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_http_client(timeout_secs, "leadbaze/0.1 (lead-toolkit)")?,
            base_url: parse_base_url(base_url)?,
            api_key: api_key.to_owned(),
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// # Errors
    ///
    /// - [`ClientError::InvalidInput`] for a blank instance name.
    /// - [`ClientError::Unauthorized`] when the API key is rejected.
    /// - [`ClientError::Http`] / [`ClientError::UnexpectedStatus`] otherwise.
    pub async fn create_instance(&self, name: &str) -> Result<InstanceInfo, ClientError> {
        let name = instance_name(name)?;
        let url = endpoint(&self.base_url, &["instance", "create"])?;
        let body = json!({
            "instanceName": name,
            "qrcode": true,
            "integration": INTEGRATION,
        });
        // Creation is not idempotent, so it is sent once.
        let response = self.request(Method::POST, url).json(&body).send().await?;
        let parsed: CreateResponse = read_json(check_status(response).await?, "create instance").await?;
        tracing::info!(instance = %parsed.instance.instance_name, "created WhatsApp instance");
        Ok(InstanceInfo {
            instance_name: parsed.instance.instance_name,
            instance_id: parsed.instance.instance_id,
            status: parsed.instance.status,
            qr: parsed.qrcode.filter(|q| !q.is_empty()),
        })
    }

    /// Current QR code for `name`, or `None` while Evolution is still
    /// generating it.
    ///
    /// # Errors
    ///
    /// As [`WhatsappClient::create_instance`]; [`ClientError::NotFound`] for
    /// an unknown instance.
    pub async fn qr_code(&self, name: &str) -> Result<Option<QrCode>, ClientError> {
        let name = instance_name(name)?;
        let url = endpoint(&self.base_url, &["instance", "connect", name])?;
        let qr: QrCode = self.get_json(url, "instance qr code").await?;
        Ok(Some(qr).filter(|q| !q.is_empty()))
    }

    /// Requests an 8 character pairing code for linking by phone number
    /// instead of scanning a QR code.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidInput`] when `number` has fewer than 10 digits,
    /// otherwise as [`WhatsappClient::qr_code`].
    pub async fn pairing_code(&self, name: &str, number: &str) -> Result<Option<String>, ClientError> {
        let name = instance_name(name)?;
        let digits = leadbaze_core::normalize_phone(number);
        if digits.len() < 10 {
            return Err(ClientError::InvalidInput(format!(
                "phone number \"{number}\" needs country and area code"
            )));
        }
        let mut url = endpoint(&self.base_url, &["instance", "connect", name])?;
        url.query_pairs_mut().append_pair("number", &digits);
        let qr: QrCode = self.get_json(url, "instance pairing code").await?;
        Ok(qr.pairing_code.filter(|c| !c.trim().is_empty()))
    }

    /// # Errors
    ///
    /// As [`WhatsappClient::qr_code`].
    pub async fn connection_state(&self, name: &str) -> Result<ConnectionState, ClientError> {
        let name = instance_name(name)?;
        let url = endpoint(&self.base_url, &["instance", "connectionState", name])?;
        let parsed: StateResponse = self.get_json(url, "connection state").await?;
        Ok(ConnectionState::parse(&parsed.instance.state))
    }

    /// Logs the number out and removes the instance.
    ///
    /// # Errors
    ///
    /// As [`WhatsappClient::qr_code`].
    pub async fn delete_instance(&self, name: &str) -> Result<(), ClientError> {
        let name = instance_name(name)?;
        let url = endpoint(&self.base_url, &["instance", "delete", name])?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let request = self.request(Method::DELETE, url.clone());
            async move { check_status(request.send().await?).await }
        })
        .await?;
        tracing::info!(instance = %name, "deleted WhatsApp instance");
        Ok(())
    }

    /// Polls for the QR code until one is available.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::QrCodeUnavailable`] once `max_attempts` fetches
    /// have passed without a code. Transient fetch errors are logged and count
    /// as attempts; any other error (bad API key, unknown instance) is
    /// returned at once.
    pub async fn wait_for_qr_code(
        &self,
        name: &str,
        max_attempts: u32,
        interval: Duration,
    ) -> Result<QrCode, ClientError> {
        let name = instance_name(name)?;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        for attempt in 1..=max_attempts {
            ticker.tick().await;
            match self.qr_code(name).await {
                Ok(Some(qr)) => return Ok(qr),
                Ok(None) => tracing::debug!(attempt, "QR code not ready yet"),
                Err(err) if is_retriable(&err) => {
                    tracing::debug!(attempt, error = %err, "QR code fetch failed");
                }
                Err(err) => return Err(err),
            }
        }
        Err(ClientError::QrCodeUnavailable {
            attempts: max_attempts,
        })
    }

    /// Polls the connection state until it reports `open`.
    #[must_use]
    pub fn watch_connection(&self, name: &str, options: PollOptions) -> PollSubscription<ConnectionState> {
        let client = self.clone();
        let name = name.to_owned();
        poll_resource(options, |s: &ConnectionState| s.is_connected(), move || {
            let client = client.clone();
            let name = name.clone();
            async move { client.connection_state(&name).await }
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url, context: &str) -> Result<T, ClientError> {
        let response = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let request = self.request(Method::GET, url.clone());
            async move { check_status(request.send().await?).await }
        })
        .await?;
        read_json(response, context).await
    }
}

fn instance_name(raw: &str) -> Result<&str, ClientError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ClientError::InvalidInput(
            "instance name must not be empty".to_owned(),
        ));
    }
    Ok(name)
}
