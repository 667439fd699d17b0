//! URL building utilities for API endpoints

use reqwest::Url;

use crate::data_fetcher::models::{QueryParams, ResourceKind, Sport};
use crate::error::AppError;

/// Builds the URL for an endpoint path with its query string.
///
/// Parameters keep their insertion order and values are percent-encoded.
/// No `?` is appended when there are no parameters.
///
/// # Example
/// ```
/// use sports_api_client::data_fetcher::api::build_endpoint_url;
/// use sports_api_client::data_fetcher::models::QueryParams;
///
/// let params = QueryParams::new().with("league", 1).with("season", 2024);
/// let url = build_endpoint_url("https://v1.rugby.api-sports.io", "teams", &params).unwrap();
/// assert_eq!(url, "https://v1.rugby.api-sports.io/teams?league=1&season=2024");
/// ```
pub fn build_endpoint_url(
    base_url: &str,
    path: &str,
    params: &QueryParams,
) -> Result<String, AppError> {
    let raw = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = Url::parse(&raw)
        .map_err(|e| AppError::config_error(format!("Invalid API URL '{raw}': {e}")))?;

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter());
    }

    Ok(url.into())
}

/// Builds the URL for `kind` on `sport`'s API.
///
/// # Errors
/// * `AppError::UnsupportedResource` - The sport's API has no such resource
pub fn build_resource_url(
    sport: Sport,
    base_url: &str,
    kind: ResourceKind,
    params: &QueryParams,
) -> Result<String, AppError> {
    let path = sport
        .path_for(kind)
        .ok_or_else(|| AppError::unsupported_resource(sport.slug(), kind.field_name()))?;
    build_endpoint_url(base_url, path, params)
}
