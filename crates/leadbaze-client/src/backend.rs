//! Client for the Supabase backend: PostgREST tables, RPCs and edge functions.
//!
//! Every request carries the project's `apikey` header plus a bearer token,
//! which is the user's session token when one is configured and the anon key
//! otherwise. Row-level security on the backend scopes results to the user.

use std::collections::HashSet;

use leadbaze_core::{
    dedupe_against, normalize_phone, partition_by_phone, AppConfig, CampaignProgress,
    DedupOutcome, Lead, LeadList, ListStatus, NewLeadList, UsageSnapshot,
};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::error::ClientError;
use crate::http::{build_http_client, check_status, parse_base_url, read_json};
use crate::kommo::{KommoConnect, KommoConnection};
use crate::retry::retry_with_backoff;

const LEAD_LISTS: &str = "rest/v1/lead_lists";
const CAMPAIGNS: &str = "rest/v1/campaigns";
const RPC_EXISTING_PHONES: &str = "rest/v1/rpc/check_existing_phones";
const RPC_USAGE: &str = "rest/v1/rpc/get_user_usage";
const FN_KOMMO_CONNECT: &str = "functions/v1/kommo-connect";

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    anon_key: String,
    access_token: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url.as_str())
            .field("anon_key", &"[redacted]")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Builds a client from the loaded application config.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `supabase_url` is not an
    /// http(s) URL, or [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        let client = build_http_client(config.http_timeout_secs, &config.http_user_agent)?;
        Ok(Self {
            client,
            base_url: parse_base_url(&config.supabase_url)?,
            anon_key: config.supabase_anon_key.clone(),
            access_token: config.access_token.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    /// Creates a client against an arbitrary base URL with retries disabled
    /// (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::from_config`].
    pub fn with_base_url(
        base_url: &str,
        anon_key: &str,
        access_token: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_http_client(timeout_secs, "leadbaze/0.1 (lead-toolkit)")?,
            base_url: parse_base_url(base_url)?,
            anon_key: anon_key.to_owned(),
            access_token: access_token.map(str::to_owned),
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Lists the user's lead lists, newest first.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Unauthorized`] when the key or token is rejected.
    /// - [`ClientError::Http`] / [`ClientError::UnexpectedStatus`] on
    ///   transport or server failure after retries.
    /// - [`ClientError::Deserialize`] if rows do not match [`LeadList`].
    pub async fn list_lead_lists(&self, user_id: &str) -> Result<Vec<LeadList>, ClientError> {
        let url = self.table_url(
            LEAD_LISTS,
            &[
                ("select", "*"),
                ("user_id", &format!("eq.{user_id}")),
                ("order", "created_at.desc"),
            ],
        )?;
        self.fetch_json(Method::GET, url, None, "list lead lists").await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] when no list with `list_id` is
    /// visible to the caller, otherwise as [`BackendClient::list_lead_lists`].
    pub async fn get_lead_list(&self, list_id: Uuid) -> Result<LeadList, ClientError> {
        let url = self.table_url(
            LEAD_LISTS,
            &[("select", "*"), ("id", &format!("eq.{list_id}"))],
        )?;
        let rows: Vec<LeadList> = self
            .fetch_json(Method::GET, url.clone(), None, "get lead list")
            .await?;
        rows.into_iter().next().ok_or_else(|| ClientError::NotFound {
            url: url.to_string(),
        })
    }

    /// Inserts a new, empty list. Sent once: a retried insert could leave a
    /// duplicate list behind.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidInput`] for a blank name, otherwise as
    /// [`BackendClient::list_lead_lists`] without retries.
    pub async fn create_lead_list(
        &self,
        user_id: &str,
        list: &NewLeadList,
    ) -> Result<LeadList, ClientError> {
        let name = list.name.trim();
        if name.is_empty() {
            return Err(ClientError::InvalidInput(
                "lead list name must not be empty".to_owned(),
            ));
        }
        let url = self.table_url(LEAD_LISTS, &[])?;
        let body = json!({
            "user_id": user_id,
            "name": name,
            "description": list.description,
            "tags": list.tags,
            "status": ListStatus::Active,
            "total_leads": 0,
            "leads": [],
        });
        let response = self.send_once(Method::POST, url.clone(), Some(&body)).await?;
        let rows: Vec<LeadList> = read_json(response, "create lead list").await?;
        let created = rows.into_iter().next().ok_or_else(|| ClientError::UnexpectedStatus {
            status: 201,
            url: url.to_string(),
            body: "insert returned no rows".to_owned(),
        })?;
        tracing::info!(list_id = %created.id, name = %created.name, "created lead list");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] when no row matched `list_id`,
    /// otherwise as [`BackendClient::list_lead_lists`].
    pub async fn delete_lead_list(&self, list_id: Uuid) -> Result<(), ClientError> {
        let url = self.table_url(LEAD_LISTS, &[("id", &format!("eq.{list_id}"))])?;
        self.write_rows(Method::DELETE, url, None, "delete lead list")
            .await?;
        tracing::info!(%list_id, "deleted lead list");
        Ok(())
    }

    /// Archives or restores a list.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] when no row matched `list_id`,
    /// otherwise as [`BackendClient::list_lead_lists`].
    pub async fn set_list_status(&self, list_id: Uuid, status: ListStatus) -> Result<(), ClientError> {
        let url = self.table_url(LEAD_LISTS, &[("id", &format!("eq.{list_id}"))])?;
        self.write_rows(
            Method::PATCH,
            url,
            Some(json!({ "status": status })),
            "update lead list status",
        )
        .await?;
        tracing::info!(%list_id, %status, "updated lead list status");
        Ok(())
    }

    /// Returns which of `phones` (normalized to digits) already appear in any
    /// of the user's lists.
    ///
    /// # Errors
    ///
    /// As [`BackendClient::list_lead_lists`].
    pub async fn existing_phones(
        &self,
        user_id: &str,
        phones: &[String],
    ) -> Result<HashSet<String>, ClientError> {
        let normalized: Vec<String> = phones
            .iter()
            .map(|p| normalize_phone(p))
            .filter(|p| !p.is_empty())
            .collect();
        if normalized.is_empty() {
            return Ok(HashSet::new());
        }
        let url = self.table_url(RPC_EXISTING_PHONES, &[])?;
        let body = json!({ "p_user_id": user_id, "p_phones": normalized });
        let found: Vec<String> = self
            .fetch_json(Method::POST, url, Some(body), "check existing phones")
            .await?;
        Ok(found.iter().map(|p| normalize_phone(p)).collect())
    }

    /// Splits `candidates` into leads not yet in any of the user's lists and
    /// leads already saved somewhere.
    ///
    /// # Errors
    ///
    /// As [`BackendClient::existing_phones`].
    pub async fn filter_known_leads(
        &self,
        user_id: &str,
        candidates: Vec<Lead>,
    ) -> Result<DedupOutcome, ClientError> {
        let phones: Vec<String> = candidates.iter().filter_map(Lead::normalized_phone).collect();
        let known = self.existing_phones(user_id, &phones).await?;
        Ok(partition_by_phone(candidates, known))
    }

    /// Appends the non-duplicate `candidates` to a list.
    ///
    /// Reads the list, dedupes by normalized phone against its leads and
    /// within the batch, then writes back the merged leads and count. Nothing
    /// is written when every candidate is a duplicate.
    ///
    /// # Errors
    ///
    /// As [`BackendClient::get_lead_list`].
    pub async fn add_leads_to_list(
        &self,
        list_id: Uuid,
        candidates: Vec<Lead>,
    ) -> Result<DedupOutcome, ClientError> {
        let list = self.get_lead_list(list_id).await?;
        let outcome = dedupe_against(candidates, &list.leads);

        if outcome.new_leads.is_empty() {
            tracing::info!(
                %list_id,
                duplicates = outcome.duplicate_leads.len(),
                "no new leads to save"
            );
            return Ok(outcome);
        }

        let mut merged = list.leads;
        merged.extend(outcome.new_leads.iter().cloned().map(|mut l| {
            l.selected = false;
            l
        }));
        let total = u32::try_from(merged.len()).unwrap_or(u32::MAX);

        let url = self.table_url(LEAD_LISTS, &[("id", &format!("eq.{list_id}"))])?;
        self.execute(
            Method::PATCH,
            url,
            Some(json!({ "leads": merged, "total_leads": total })),
        )
        .await?;

        tracing::info!(
            %list_id,
            added = outcome.new_leads.len(),
            duplicates = outcome.duplicate_leads.len(),
            total,
            "saved leads to list"
        );
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown campaign, otherwise
    /// as [`BackendClient::list_lead_lists`].
    pub async fn campaign_progress(&self, campaign_id: Uuid) -> Result<CampaignProgress, ClientError> {
        let url = self.table_url(
            CAMPAIGNS,
            &[
                (
                    "select",
                    "id,name,status,success_count,failed_count,total_leads,current_lead,started_at",
                ),
                ("id", &format!("eq.{campaign_id}")),
            ],
        )?;
        let rows: Vec<CampaignProgress> = self
            .fetch_json(Method::GET, url.clone(), None, "campaign progress")
            .await?;
        rows.into_iter().next().ok_or_else(|| ClientError::NotFound {
            url: url.to_string(),
        })
    }

    /// Plan limits, consumption and billing period for the user.
    ///
    /// # Errors
    ///
    /// As [`BackendClient::list_lead_lists`].
    pub async fn usage_snapshot(&self, user_id: &str) -> Result<UsageSnapshot, ClientError> {
        let url = self.table_url(RPC_USAGE, &[])?;
        self.fetch_json(
            Method::POST,
            url,
            Some(json!({ "p_user_id": user_id })),
            "usage snapshot",
        )
        .await
    }

    /// Exchanges a Kommo authorization code through the backend, which holds
    /// the client secret and stores the resulting tokens. The code is single
    /// use, so the request is never retried.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidInput`] for a blank code, otherwise as
    /// [`BackendClient::list_lead_lists`] without retries.
    pub async fn connect_kommo(&self, request: &KommoConnect) -> Result<KommoConnection, ClientError> {
        if request.code.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "authorization code must not be empty".to_owned(),
            ));
        }
        let url = self.table_url(FN_KOMMO_CONNECT, &[])?;
        let body = serde_json::to_value(request).map_err(|e| ClientError::Deserialize {
            context: "kommo connect request".to_owned(),
            source: e,
        })?;
        let response = self.send_once(Method::POST, url, Some(&body)).await?;
        let connection: KommoConnection = read_json(response, "kommo connect").await?;
        tracing::info!(subdomain = %connection.subdomain, "connected Kommo account");
        Ok(connection)
    }

    fn table_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .header("Prefer", "return=representation")
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, ClientError> {
        let mut request = self.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        check_status(request.send().await?).await
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<Response, ClientError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send_once(method.clone(), url.clone(), body.as_ref())
        })
        .await
    }

    /// Runs a PATCH or DELETE filtered by id and fails with
    /// [`ClientError::NotFound`] when the returned representation is empty.
    async fn write_rows(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
        context: &str,
    ) -> Result<(), ClientError> {
        let rows: Vec<serde_json::Value> = self
            .fetch_json(method, url.clone(), body, context)
            .await?;
        if rows.is_empty() {
            return Err(ClientError::NotFound {
                url: url.to_string(),
            });
        }
        Ok(())
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
        context: &str,
    ) -> Result<T, ClientError> {
        let response = self.execute(method, url, body).await?;
        read_json(response, context).await
    }
}
