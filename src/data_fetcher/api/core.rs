use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::fetch_utils::fetch;
use super::http_client::create_http_client_with_timeout;
use super::urls::build_resource_url;
use crate::config::Config;
use crate::data_fetcher::models::{ApiEnvelope, QueryParams, ResourceKind, Sport};
use crate::data_fetcher::service::ResponseFetcher;
use crate::error::AppError;

/// HTTP client for one sport's data API.
#[derive(Debug, Clone)]
pub struct SportsApiClient {
    sport: Sport,
    base_url: String,
    api_key: String,
    client: Client,
}

impl SportsApiClient {
    /// Builds a client for `sport` from the configured key, timeout and
    /// optional base URL override.
    pub fn new(sport: Sport, config: &Config) -> Result<Self, AppError> {
        let client = create_http_client_with_timeout(config.http_timeout_seconds)?;
        Ok(Self::with_client(
            sport,
            config.base_url_for(sport),
            config.api_key.clone(),
            client,
        ))
    }

    /// Builds a client around an existing `reqwest::Client`, sharing its
    /// connection pool.
    pub fn with_client(
        sport: Sport,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            sport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    pub fn sport(&self) -> Sport {
        self.sport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for `kind` with `params`.
    pub fn endpoint_url(&self, kind: ResourceKind, params: &QueryParams) -> Result<String, AppError> {
        build_resource_url(self.sport, &self.base_url, kind, params)
    }

    /// Fetches the envelope for `kind`, rejecting envelopes that report
    /// errors.
    #[instrument(skip_all, fields(sport = %self.sport, kind = %kind))]
    pub async fn fetch_envelope<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        params: &QueryParams,
    ) -> Result<ApiEnvelope<T>, AppError> {
        let url = self.endpoint_url(kind, params)?;
        let envelope: ApiEnvelope<T> = fetch(&self.client, &url, &self.api_key).await?;

        if envelope.has_errors() {
            let messages = envelope.errors.messages();
            warn!(
                "API reported {} error(s) for {}: {}",
                messages.len(),
                url,
                messages.join("; ")
            );
            return Err(AppError::api_response(envelope.get, messages));
        }

        debug!(
            "Fetched {} result(s) for {} (get={})",
            envelope.results, kind, envelope.get
        );
        Ok(envelope)
    }

    /// Fetches `kind` and returns only the `response` payload.
    pub async fn fetch_response<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        params: &QueryParams,
    ) -> Result<Vec<T>, AppError> {
        self.fetch_envelope(kind, params).await?.into_response()
    }
}

#[async_trait]
impl ResponseFetcher for SportsApiClient {
    async fn fetch_response(
        &self,
        kind: ResourceKind,
        params: &QueryParams,
    ) -> Result<Vec<Value>, AppError> {
        self.fetch_envelope::<Value>(kind, params)
            .await?
            .into_response()
    }
}
