//! Client for the lead generation webhook.
//!
//! A single POST runs a directory search for a business type in a location
//! and returns the leads found. The call is not retried: each request is
//! billed against the user's lead quota.

use leadbaze_core::{AppConfig, Lead};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::http::{build_http_client, check_status, parse_base_url, read_json};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub business_type: String,
    pub location: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationResult {
    pub leads: Vec<Lead>,
    /// Set when the webhook answered with sample data instead of a live search.
    pub demo_mode: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Bare(Vec<Lead>),
    Wrapped {
        #[serde(default)]
        leads: Vec<Lead>,
        #[serde(default, alias = "demoMode")]
        demo_mode: bool,
    },
}

impl From<GenerationResponse> for GenerationResult {
    fn from(response: GenerationResponse) -> Self {
        match response {
            GenerationResponse::Wrapped { leads, demo_mode } => Self { leads, demo_mode },
            GenerationResponse::Bare(leads) => Self {
                leads,
                demo_mode: false,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorClient {
    client: Client,
    url: Url,
    max_quantity: u32,
}

impl GeneratorClient {
    /// # Errors
    ///
    /// - [`ClientError::MissingConfig`] if `LEADBAZE_GENERATOR_URL` is unset.
    /// - [`ClientError::InvalidBaseUrl`] if it is not an http(s) URL.
    /// - [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        let raw = config
            .generator_url
            .as_deref()
            .ok_or(ClientError::MissingConfig("LEADBAZE_GENERATOR_URL"))?;
        Self::new(
            raw,
            config.generator_max_quantity,
            config.http_timeout_secs,
            &config.http_user_agent,
        )
    }

    /// # Errors
    ///
    /// As [`GeneratorClient::from_config`], minus the missing-config case.
    pub fn new(
        webhook_url: &str,
        max_quantity: u32,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let mut url = parse_base_url(webhook_url)?;
        // Webhook URLs are used verbatim, not as a base for joins.
        let trimmed = url.path().trim_end_matches('/').to_owned();
        url.set_path(&trimmed);
        Ok(Self {
            client: build_http_client(timeout_secs, user_agent)?,
            url,
            max_quantity,
        })
    }

    #[must_use]
    pub fn max_quantity(&self) -> u32 {
        self.max_quantity
    }

    /// Validates `request` without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidInput`] for a blank business type or
    /// location, or a quantity outside `1..=max_quantity`.
    pub fn validate(&self, request: &GenerationRequest) -> Result<(), ClientError> {
        if request.business_type.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "business type must not be empty".to_owned(),
            ));
        }
        if request.location.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "location must not be empty".to_owned(),
            ));
        }
        if request.quantity == 0 || request.quantity > self.max_quantity {
            return Err(ClientError::InvalidInput(format!(
                "quantity must be between 1 and {}, got {}",
                self.max_quantity, request.quantity
            )));
        }
        Ok(())
    }

    /// Runs a search.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidInput`] when validation fails (nothing is sent).
    /// - [`ClientError::Http`] / [`ClientError::UnexpectedStatus`] /
    ///   [`ClientError::RateLimited`] on transport or service failure.
    /// - [`ClientError::Deserialize`] if the body is neither a lead array nor
    ///   a `{ leads, demo_mode }` object.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ClientError> {
        self.validate(request)?;
        let body = GenerationRequest {
            business_type: request.business_type.trim().to_owned(),
            location: request.location.trim().to_owned(),
            quantity: request.quantity,
        };

        tracing::info!(
            business_type = %body.business_type,
            location = %body.location,
            quantity = body.quantity,
            "requesting lead generation"
        );
        let response = self.client.post(self.url.clone()).json(&body).send().await?;
        let response = check_status(response).await?;
        let parsed: GenerationResponse = read_json(response, "lead generation").await?;
        let result = GenerationResult::from(parsed);

        if result.demo_mode {
            tracing::warn!(leads = result.leads.len(), "generator answered in demo mode");
        } else {
            tracing::info!(leads = result.leads.len(), "lead generation finished");
        }
        Ok(result)
    }
}
