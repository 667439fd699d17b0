//! Cache-then-fetch access to API resources

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::data_fetcher::cache::{CacheStore, generate_key};
use crate::data_fetcher::models::{QueryParams, ResourceKind};
use crate::error::AppError;

/// Source of response payloads for a resource kind.
#[async_trait]
pub trait ResponseFetcher: Send + Sync {
    /// Fetches the `response` items of the envelope for `kind`.
    async fn fetch_response(
        &self,
        kind: ResourceKind,
        params: &QueryParams,
    ) -> Result<Vec<Value>, AppError>;
}

/// Combines a fetcher with a [`CacheStore`].
///
/// Valid cache entries are served without touching the network. The cache
/// is only written after a successful fetch, so a failed request never
/// evicts what was cached before.
#[derive(Debug)]
pub struct SportsDataService<F> {
    fetcher: F,
    cache: CacheStore,
}

impl<F: ResponseFetcher> SportsDataService<F> {
    pub fn new(fetcher: F, cache: CacheStore) -> Self {
        Self { fetcher, cache }
    }

    /// Cached payload for `kind` when still valid, otherwise a fresh fetch.
    #[instrument(skip(self, params), fields(store = %self.cache.name()))]
    pub async fn fetch(
        &mut self,
        kind: ResourceKind,
        params: &QueryParams,
    ) -> Result<Vec<Value>, AppError> {
        if !is_cacheable(kind, params) {
            debug!("Filtered request for single-value {}, bypassing cache", kind);
            return self.fetcher.fetch_response(kind, params).await;
        }

        let key = generate_key(kind, Some(params));

        if let Some(cached) = self.cache.get::<Vec<Value>>(kind, Some(&key)) {
            debug!("Serving {} from cache: key={}", kind, key);
            return Ok(cached);
        }

        info!("Cache miss for {}, fetching from API", kind);
        self.fetch_and_store(kind, params, key).await
    }

    /// Like [`fetch`](Self::fetch) with every item converted to `T`.
    pub async fn fetch_as<T: DeserializeOwned>(
        &mut self,
        kind: ResourceKind,
        params: &QueryParams,
    ) -> Result<Vec<T>, AppError> {
        let items = self.fetch(kind, params).await?;
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(AppError::from))
            .collect()
    }

    /// Fetches `kind` regardless of the cache and stores the result.
    /// On failure the previous entry stays in place.
    #[instrument(skip(self, params), fields(store = %self.cache.name()))]
    pub async fn refresh(
        &mut self,
        kind: ResourceKind,
        params: &QueryParams,
    ) -> Result<Vec<Value>, AppError> {
        if !is_cacheable(kind, params) {
            return self.fetcher.fetch_response(kind, params).await;
        }
        let key = generate_key(kind, Some(params));
        self.fetch_and_store(kind, params, key).await
    }

    async fn fetch_and_store(
        &mut self,
        kind: ResourceKind,
        params: &QueryParams,
        key: String,
    ) -> Result<Vec<Value>, AppError> {
        match self.fetcher.fetch_response(kind, params).await {
            Ok(items) => {
                debug!("Caching {} item(s) for {}: key={}", items.len(), kind, key);
                self.cache.set(kind, Some(&key), &items);
                Ok(items)
            }
            Err(e) => {
                warn!("Fetching {} failed, cache left untouched: {}", kind, e);
                Err(e)
            }
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut CacheStore {
        &mut self.cache
    }

    /// Gives the store back, e.g. to flush it on shutdown.
    pub fn into_cache(self) -> CacheStore {
        self.cache
    }
}

/// Single-value kinds hold one entry, so only their unfiltered form is
/// cached.
fn is_cacheable(kind: ResourceKind, params: &QueryParams) -> bool {
    kind.is_keyed() || params.is_empty()
}
