//! Sports Data API Client Library
//!
//! Typed access to the api-sports.io family of sport APIs with a shared
//! response cache. Cached responses expire after a store-wide TTL and can be
//! persisted between runs through a pluggable storage adapter.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sports_api_client::{
//!     AppError, CacheStore, Config, FileStorage, QueryParams, ResourceKind, Sport,
//!     SportsApiClient, SportsDataService,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load().await?;
//!     let sport = Sport::Rugby;
//!
//!     let storage = FileStorage::new(config.cache_dir_path());
//!     let cache = CacheStore::open(sport.cache_store_name(), Arc::new(storage)).await;
//!     let client = SportsApiClient::new(sport, &config)?;
//!     let mut service = SportsDataService::new(client, cache);
//!
//!     let params = QueryParams::new().with("league", 16).with("season", 2024);
//!     let teams = service.fetch(ResourceKind::Teams, &params).await?;
//!     println!("{} teams", teams.len());
//!
//!     // Queued cache writes are flushed before exit
//!     service.cache().flush().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod data_fetcher;
pub mod error;

// Re-export commonly used types for convenience
pub use config::Config;
pub use data_fetcher::api::SportsApiClient;
pub use data_fetcher::cache::{
    CacheEntry, CacheStats, CacheStore, Clock, FileStorage, ManualClock, MemoryStorage,
    StorageAdapter, SystemClock, generate_key,
};
pub use data_fetcher::models::{ApiEnvelope, ApiErrors, QueryParams, ResourceKind, Sport};
pub use data_fetcher::service::{ResponseFetcher, SportsDataService};
pub use error::AppError;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
