//! Single-attempt HTTP fetching with status and body error mapping

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

use crate::constants::API_KEY_HEADER;
use crate::error::AppError;

/// Fetches `url` with the API key header and parses the body as `T`.
///
/// Non-success statuses are mapped to the typed HTTP errors, transport
/// failures to the network errors, and bodies that do not parse are
/// classified as empty, malformed or unexpectedly shaped.
#[instrument(skip(client, api_key))]
pub(super) async fn fetch<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    api_key: &str,
) -> Result<T, AppError> {
    info!("Fetching data from URL: {url}");

    let response = match client.get(url).header(API_KEY_HEADER, api_key).send().await {
        Ok(resp) => resp,
        Err(e) => {
            error!("Request failed for URL {}: {}", url, e);
            return if e.is_timeout() {
                Err(AppError::network_timeout(url))
            } else if e.is_connect() {
                Err(AppError::network_connection(url, e.to_string()))
            } else {
                Err(AppError::ApiFetch(e))
            };
        }
    };

    let status = response.status();
    debug!("Response status: {status}");

    if !status.is_success() {
        let status_code = status.as_u16();
        let reason = status.canonical_reason().unwrap_or("Unknown error");

        error!("HTTP {} - {} (URL: {})", status_code, reason, url);

        return Err(match status_code {
            404 => AppError::api_not_found(url),
            429 => AppError::api_rate_limit(reason, url),
            400..=499 => AppError::api_client_error(status_code, reason, url),
            502 | 503 => AppError::api_service_unavailable(status_code, reason, url),
            _ => AppError::api_server_error(status_code, reason, url),
        });
    }

    let response_text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read response text from URL {}: {}", url, e);
            return Err(AppError::ApiFetch(e));
        }
    };

    debug!("Response length: {} bytes", response_text.len());
    let preview: String = response_text.chars().take(1024).collect();
    debug!("Response text (first 1024 chars): {preview}");

    parse_body(&response_text, url)
}

fn parse_body<T: DeserializeOwned>(body: &str, url: &str) -> Result<T, AppError> {
    match serde_json::from_str::<T>(body) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            error!("Failed to parse API response: {} (URL: {})", e, url);

            let trimmed = body.trim_start();
            if trimmed.is_empty() {
                Err(AppError::api_no_data("Response body is empty", url))
            } else if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
                Err(AppError::api_malformed_json("Response is not valid JSON", url))
            } else if e.is_syntax() || e.is_eof() {
                Err(AppError::api_malformed_json(e.to_string(), url))
            } else {
                Err(AppError::api_unexpected_structure(e.to_string(), url))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const URL: &str = "https://api.example.com/teams";

    #[test]
    fn test_parse_body_classifies_failures() {
        assert!(matches!(
            parse_body::<Value>("   ", URL),
            Err(AppError::ApiNoData { .. })
        ));
        assert!(matches!(
            parse_body::<Value>("<html>oops</html>", URL),
            Err(AppError::ApiMalformedJson { .. })
        ));
        assert!(matches!(
            parse_body::<Value>(r#"{"response": ["#, URL),
            Err(AppError::ApiMalformedJson { .. })
        ));
        assert!(matches!(
            parse_body::<Vec<u32>>(r#"{"response": []}"#, URL),
            Err(AppError::ApiUnexpectedStructure { .. })
        ));
    }

    #[test]
    fn test_parse_body_success() {
        let parsed: Vec<u32> = parse_body("[1, 2, 3]", URL).unwrap();
        assert_eq!(parsed, vec![1, 2, 3]);
    }
}
