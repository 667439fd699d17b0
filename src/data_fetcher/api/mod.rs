pub mod http_client;
pub mod urls;
mod core;
mod fetch_utils;

pub use core::SportsApiClient;
pub use http_client::create_http_client_with_timeout;
pub use urls::{build_endpoint_url, build_resource_url};
