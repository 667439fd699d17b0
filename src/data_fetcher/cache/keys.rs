//! Cache key derivation from request parameters

use serde_json::Value;

use crate::data_fetcher::models::{QueryParams, ResourceKind};

/// Fingerprint used when a request carries no parameters. Canonical
/// parameter serializations always start with `[`, so it cannot collide.
pub const NO_PARAMS_FINGERPRINT: &str = "*";

/// Derives the cache key for a request.
///
/// Parameters are stable-sorted by name and serialized as a JSON array of
/// `[name, value]` pairs, so insertion order never affects the key.
/// Missing or empty parameters map to [`NO_PARAMS_FINGERPRINT`].
///
/// # Example
/// ```
/// use sports_api_client::data_fetcher::cache::generate_key;
/// use sports_api_client::data_fetcher::models::{QueryParams, ResourceKind};
///
/// let a = QueryParams::new().with("league", 1).with("season", 2024);
/// let b = QueryParams::new().with("season", 2024).with("league", 1);
/// assert_eq!(
///     generate_key(ResourceKind::Teams, Some(&a)),
///     generate_key(ResourceKind::Teams, Some(&b)),
/// );
/// assert_eq!(
///     generate_key(ResourceKind::Teams, Some(&a)),
///     r#"teams:[["league","1"],["season","2024"]]"#,
/// );
/// assert_eq!(generate_key(ResourceKind::Teams, None), "teams:*");
/// ```
pub fn generate_key(kind: ResourceKind, params: Option<&QueryParams>) -> String {
    let fingerprint = match params.filter(|p| !p.is_empty()) {
        Some(params) => canonical_params(params),
        None => NO_PARAMS_FINGERPRINT.to_string(),
    };
    format!("{}:{fingerprint}", kind.field_name())
}

fn canonical_params(params: &QueryParams) -> String {
    let pairs = params
        .sorted_pairs()
        .into_iter()
        .map(|(name, value)| {
            Value::Array(vec![
                Value::String(name.to_string()),
                Value::String(value.to_string()),
            ])
        })
        .collect();
    Value::Array(pairs).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutations_share_a_key() {
        let names = ["season", "league", "team", "date"];
        let values = ["2024", "1", "10", "2024-05-01"];
        let forward: QueryParams = names.iter().zip(values.iter()).map(|(n, v)| (*n, *v)).collect();
        let reverse: QueryParams = names
            .iter()
            .zip(values.iter())
            .rev()
            .map(|(n, v)| (*n, *v))
            .collect();
        let rotated: QueryParams = names
            .iter()
            .zip(values.iter())
            .cycle()
            .skip(2)
            .take(4)
            .map(|(n, v)| (*n, *v))
            .collect();

        let key = generate_key(ResourceKind::Games, Some(&forward));
        assert_eq!(key, generate_key(ResourceKind::Games, Some(&reverse)));
        assert_eq!(key, generate_key(ResourceKind::Games, Some(&rotated)));
    }

    #[test]
    fn test_empty_and_absent_params_share_sentinel() {
        let empty = QueryParams::new();
        assert_eq!(
            generate_key(ResourceKind::Leagues, Some(&empty)),
            generate_key(ResourceKind::Leagues, None)
        );
        assert_eq!(generate_key(ResourceKind::Leagues, None), "leagues:*");
    }

    #[test]
    fn test_sentinel_differs_from_star_valued_param() {
        let params = QueryParams::new().with("*", "*");
        assert_ne!(
            generate_key(ResourceKind::Teams, Some(&params)),
            generate_key(ResourceKind::Teams, None)
        );
    }

    #[test]
    fn test_kind_is_part_of_the_key() {
        let params = QueryParams::new().with("league", 1);
        assert_ne!(
            generate_key(ResourceKind::Teams, Some(&params)),
            generate_key(ResourceKind::Standings, Some(&params))
        );
    }

    #[test]
    fn test_values_with_separators_stay_distinct() {
        let a = QueryParams::new().with("search", "a,b").with("x", "c");
        let b = QueryParams::new().with("search", "a").with("x", "b,c");
        assert_ne!(
            generate_key(ResourceKind::Teams, Some(&a)),
            generate_key(ResourceKind::Teams, Some(&b))
        );
    }
}
