//! Cache data structures with TTL support

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::data_fetcher::models::ResourceKind;

/// A cached payload together with the epoch-millisecond time it was captured.
///
/// Entries are never mutated. Writing the same key again replaces the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    data: T,
    timestamp: i64,
}

impl<T> CacheEntry<T> {
    /// Creates a new entry captured at `timestamp` (epoch milliseconds)
    pub fn new(data: T, timestamp: i64) -> Self {
        Self { data, timestamp }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Age of the entry at `now`, in milliseconds
    pub fn age_millis(&self, now: i64) -> i64 {
        now.saturating_sub(self.timestamp)
    }

    /// Checks the entry against a TTL at a given instant
    pub fn is_valid_at(&self, now: i64, ttl: Duration) -> bool {
        is_fresh(self.timestamp, now, ttl)
    }
}

/// `now - timestamp < ttl`, the single validity rule of the cache.
pub fn is_fresh(timestamp: i64, now: i64, ttl: Duration) -> bool {
    now.saturating_sub(timestamp) < duration_millis(ttl)
}

pub(crate) fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Storage for one resource kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheTable {
    Single(Option<CacheEntry<Value>>),
    Keyed(BTreeMap<String, CacheEntry<Value>>),
}

impl CacheTable {
    /// Empty table of the right shape for `kind`
    pub fn empty_for(kind: ResourceKind) -> Self {
        if kind.is_keyed() {
            CacheTable::Keyed(BTreeMap::new())
        } else {
            CacheTable::Single(None)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CacheTable::Single(entry) => usize::from(entry.is_some()),
            CacheTable::Keyed(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> Box<dyn Iterator<Item = &CacheEntry<Value>> + '_> {
        match self {
            CacheTable::Single(entry) => Box::new(entry.iter()),
            CacheTable::Keyed(entries) => Box::new(entries.values()),
        }
    }

    pub fn clear(&mut self) {
        match self {
            CacheTable::Single(entry) => *entry = None,
            CacheTable::Keyed(entries) => entries.clear(),
        }
    }
}

/// Entry counts for one resource kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindStats {
    pub kind: ResourceKind,
    pub entries: usize,
    pub valid: usize,
}

/// Cache statistics for monitoring purposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub store: String,
    pub ttl: Duration,
    pub kinds: Vec<KindStats>,
}

impl CacheStats {
    pub fn total_entries(&self) -> usize {
        self.kinds.iter().map(|k| k.entries).sum()
    }

    pub fn total_valid(&self) -> usize {
        self.kinds.iter().map(|k| k.valid).sum()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cache: {}", self.store)?;
        writeln!(f, "TTL: {}s", self.ttl.as_secs())?;
        for stats in self.kinds.iter().filter(|k| k.entries > 0) {
            writeln!(
                f,
                "  {:<16} {:>4} entries ({} valid)",
                stats.kind.field_name(),
                stats.entries,
                stats.valid
            )?;
        }
        write!(
            f,
            "Total: {} entries ({} valid)",
            self.total_entries(),
            self.total_valid()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_validity_boundary() {
        let entry = CacheEntry::new(json!([1]), 1_000);
        let ttl = Duration::from_millis(500);
        assert!(entry.is_valid_at(1_000, ttl));
        assert!(entry.is_valid_at(1_499, ttl));
        assert!(!entry.is_valid_at(1_500, ttl));
        assert!(!entry.is_valid_at(9_999, ttl));
    }

    #[test]
    fn test_entry_serializes_data_and_timestamp() {
        let entry = CacheEntry::new(json!({"id": 1}), 42);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, json!({"data": {"id": 1}, "timestamp": 42}));
    }

    #[test]
    fn test_table_shape_follows_kind() {
        assert_eq!(
            CacheTable::empty_for(ResourceKind::Countries),
            CacheTable::Single(None)
        );
        assert!(matches!(
            CacheTable::empty_for(ResourceKind::Teams),
            CacheTable::Keyed(_)
        ));
    }

    #[test]
    fn test_table_len_and_clear() {
        let mut table = CacheTable::empty_for(ResourceKind::Teams);
        if let CacheTable::Keyed(entries) = &mut table {
            entries.insert("a".to_string(), CacheEntry::new(json!(1), 0));
            entries.insert("b".to_string(), CacheEntry::new(json!(2), 0));
        }
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries().count(), 2);
        table.clear();
        assert!(table.is_empty());
    }

    #[test]
    fn test_huge_duration_does_not_overflow() {
        assert!(is_fresh(0, i64::MAX - 1, Duration::MAX));
        assert!(!is_fresh(0, 1, Duration::ZERO));
    }
}
