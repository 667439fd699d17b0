use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::AppError;

/// Errors reported inside a response envelope. The API sends either a list
/// of messages or an object keyed by the offending field, and `[]` when
/// there is nothing to report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiErrors {
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl Default for ApiErrors {
    fn default() -> Self {
        ApiErrors::List(Vec::new())
    }
}

impl ApiErrors {
    pub fn is_empty(&self) -> bool {
        match self {
            ApiErrors::List(list) => list.is_empty(),
            ApiErrors::Map(map) => map.is_empty(),
        }
    }

    /// Flattens the errors into display messages, `field: message` for the
    /// object form.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ApiErrors::List(list) => list.clone(),
            ApiErrors::Map(map) => map
                .iter()
                .map(|(field, message)| format!("{field}: {message}"))
                .collect(),
        }
    }
}

/// The uniform wrapper every endpoint responds with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub get: String,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub errors: ApiErrors,
    #[serde(default)]
    pub results: i64,
    #[serde(deserialize_with = "one_or_many")]
    pub response: Vec<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Unwraps the payload, turning reported envelope errors into
    /// [`AppError::ApiResponse`].
    pub fn into_response(self) -> Result<Vec<T>, AppError> {
        if self.has_errors() {
            return Err(AppError::api_response(self.get, self.errors.messages()));
        }
        Ok(self.response)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParametersRepr {
    Map(BTreeMap<String, Value>),
    List(Vec<Value>),
}

fn map_or_empty_list<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let parameters = match ParametersRepr::deserialize(deserializer)? {
        ParametersRepr::Map(map) => map
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (name, value)
            })
            .collect(),
        ParametersRepr::List(items) if items.is_empty() => BTreeMap::new(),
        ParametersRepr::List(items) => {
            return Err(D::Error::custom(format!(
                "expected parameters object, got a list of {} item(s)",
                items.len()
            )));
        }
    };
    Ok(parameters)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

// Statistics endpoints answer with a single object instead of a list.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match OneOrMany::<T>::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_successful_envelope() {
        let body = json!({
            "get": "teams",
            "parameters": {"league": "1", "season": "2024"},
            "errors": [],
            "results": 1,
            "response": [{"id": 1, "name": "X"}]
        });
        let envelope: ApiEnvelope<Value> = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.get, "teams");
        assert_eq!(envelope.parameters.get("league").map(String::as_str), Some("1"));
        assert!(!envelope.has_errors());
        assert_eq!(envelope.results, 1);
        assert_eq!(
            envelope.into_response().unwrap(),
            vec![json!({"id": 1, "name": "X"})]
        );
    }

    #[test]
    fn test_empty_parameters_as_list() {
        let body = json!({
            "get": "timezone",
            "parameters": [],
            "errors": [],
            "results": 2,
            "response": ["Europe/Helsinki", "UTC"]
        });
        let envelope: ApiEnvelope<String> = serde_json::from_value(body).unwrap();
        assert!(envelope.parameters.is_empty());
        assert_eq!(envelope.response, vec!["Europe/Helsinki", "UTC"]);
    }

    #[test]
    fn test_numeric_parameter_values_become_strings() {
        let body = json!({
            "get": "games",
            "parameters": {"league": 1},
            "errors": [],
            "results": 0,
            "response": []
        });
        let envelope: ApiEnvelope<Value> = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.parameters.get("league").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_errors_as_map_become_api_response_error() {
        let body = json!({
            "get": "teams",
            "parameters": [],
            "errors": {"token": "Error/Missing application key."},
            "results": 0,
            "response": []
        });
        let envelope: ApiEnvelope<Value> = serde_json::from_value(body).unwrap();
        assert!(envelope.has_errors());
        let err = envelope.into_response().unwrap_err();
        match err {
            AppError::ApiResponse { endpoint, errors } => {
                assert_eq!(endpoint, "teams");
                assert_eq!(errors, vec!["token: Error/Missing application key."]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_errors_as_list() {
        let body = json!({
            "get": "games",
            "parameters": [],
            "errors": ["The Season field is required."],
            "results": 0,
            "response": []
        });
        let envelope: ApiEnvelope<Value> = serde_json::from_value(body).unwrap();
        assert_eq!(
            envelope.errors.messages(),
            vec!["The Season field is required."]
        );
    }

    #[test]
    fn test_single_object_response_is_wrapped() {
        let body = json!({
            "get": "teams/statistics",
            "parameters": {"team": "5"},
            "errors": [],
            "results": 1,
            "response": {"games": {"played": 10}}
        });
        let envelope: ApiEnvelope<Value> = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.response.len(), 1);
        assert_eq!(envelope.response[0]["games"]["played"], 10);
    }

    #[test]
    fn test_missing_response_is_an_error() {
        let body = json!({"get": "teams", "errors": [], "results": 0});
        assert!(serde_json::from_value::<ApiEnvelope<Value>>(body).is_err());
    }
}
