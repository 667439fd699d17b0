pub mod api;
pub mod cache;
pub mod models;
pub mod service;

pub use api::SportsApiClient;
pub use cache::{CacheStore, FileStorage, MemoryStorage, StorageAdapter};
pub use models::{ApiEnvelope, QueryParams, ResourceKind, Sport};
pub use service::{ResponseFetcher, SportsDataService};
