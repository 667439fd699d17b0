use std::fmt::Display;
use std::str::FromStr;

use crate::error::AppError;

/// Request parameters for one endpoint call.
///
/// Keeps insertion order for the query string. Inserting a name that is
/// already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        let name = name.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(existing, _)| *existing == name) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pairs stable-sorted by name, the canonical order for cache keys.
    pub fn sorted_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Parses a `name=value` command line argument.
impl FromStr for QueryParams {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut params = QueryParams::new();
        for part in s.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = part.split_once('=').ok_or_else(|| {
                AppError::invalid_parameter(format!("Expected name=value, got '{part}'"))
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::invalid_parameter(format!(
                    "Parameter name is empty in '{part}'"
                )));
            }
            params.insert(name, value.trim());
        }
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_existing_value() {
        let params = QueryParams::new()
            .with("league", 1)
            .with("season", 2024)
            .with("league", 5);
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("league"), Some("5"));
        let order: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["league", "season"]);
    }

    #[test]
    fn test_sorted_pairs() {
        let params = QueryParams::new().with("season", 2024).with("id", 7).with("league", 1);
        assert_eq!(
            params.sorted_pairs(),
            vec![("id", "7"), ("league", "1"), ("season", "2024")]
        );
    }

    #[test]
    fn test_parse_from_str() {
        let params: QueryParams = "league=1&season=2024".parse().unwrap();
        assert_eq!(params.get("league"), Some("1"));
        assert_eq!(params.get("season"), Some("2024"));

        let single: QueryParams = "search=New York".parse().unwrap();
        assert_eq!(single.get("search"), Some("New York"));

        assert!("league".parse::<QueryParams>().is_err());
        assert!("=1".parse::<QueryParams>().is_err());
    }

    #[test]
    fn test_collect_from_pairs() {
        let params: QueryParams = [("team", "10"), ("season", "2023")].into_iter().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("team"), Some("10"));
    }
}
