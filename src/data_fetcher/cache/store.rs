//! The response cache store: per-kind tables, a shared TTL and optional
//! persistence through a [`StorageAdapter`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::clock::{Clock, SystemClock};
use super::keys;
use super::persistence::{PersistenceWriter, decode_state, encode_state};
use super::storage::StorageAdapter;
use super::types::{CacheEntry, CacheStats, CacheTable, KindStats, duration_millis, is_fresh};
use crate::constants::cache_ttl;
use crate::data_fetcher::models::{QueryParams, ResourceKind};

/// Cache of API responses for one store name (usually one sport).
///
/// Reads and writes happen on the owner's thread with no locking. When the
/// store was opened with an adapter, every mutation queues a snapshot of the
/// full state to a background writer and returns without waiting for it.
pub struct CacheStore {
    name: String,
    ttl: Duration,
    tables: BTreeMap<ResourceKind, CacheTable>,
    clock: Arc<dyn Clock>,
    writer: Option<PersistenceWriter>,
    dirty: bool,
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("entries", &self.tables.values().map(CacheTable::len).sum::<usize>())
            .field("persistent", &self.writer.is_some())
            .field("dirty", &self.dirty)
            .finish()
    }
}

fn empty_tables() -> BTreeMap<ResourceKind, CacheTable> {
    ResourceKind::ALL
        .iter()
        .map(|kind| (*kind, CacheTable::empty_for(*kind)))
        .collect()
}

impl CacheStore {
    /// Store without persistence, using the system clock.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self::with_clock(name, Arc::new(SystemClock))
    }

    /// Store without persistence, reading time from `clock`.
    pub fn with_clock(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            ttl: Duration::from_millis(cache_ttl::DEFAULT_MILLIS),
            tables: empty_tables(),
            clock,
            writer: None,
            dirty: false,
        }
    }

    /// Opens a persistent store, hydrating it from whatever `adapter` holds
    /// under `name`. Must be called inside a tokio runtime.
    pub async fn open(name: impl Into<String>, adapter: Arc<dyn StorageAdapter>) -> Self {
        Self::open_with_clock(name, adapter, Arc::new(SystemClock)).await
    }

    #[instrument(skip_all, fields(store = tracing::field::Empty))]
    pub async fn open_with_clock(
        name: impl Into<String>,
        adapter: Arc<dyn StorageAdapter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let name = name.into();
        tracing::Span::current().record("store", name.as_str());

        let mut store = Self::with_clock(name.clone(), clock);

        match adapter.get(&name).await {
            Ok(Some(blob)) => match decode_state(&blob) {
                Ok(restored) => {
                    if let Some(ttl_millis) = restored.ttl_millis {
                        store.ttl = Duration::from_millis(ttl_millis);
                    }
                    store.tables = restored.tables;
                    info!(
                        "Restored cache '{}' with {} entries (ttl={}ms)",
                        name,
                        store.tables.values().map(CacheTable::len).sum::<usize>(),
                        store.ttl.as_millis()
                    );
                }
                Err(e) => warn!("Discarding persisted cache '{}': {}", name, e),
            },
            Ok(None) => debug!("No persisted cache found for '{name}'"),
            Err(e) => warn!("Failed to read persisted cache '{}': {}", name, e),
        }

        store.writer = Some(PersistenceWriter::spawn(name, adapter));
        store
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The TTL currently applied to reads
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Changes the TTL for every later validity check. Nothing is evicted;
    /// entries that were stale under a shorter TTL become readable again.
    pub fn set_ttl(&mut self, ttl: Duration) {
        debug!(
            "Cache '{}' TTL changed from {}ms to {}ms",
            self.name,
            self.ttl.as_millis(),
            ttl.as_millis()
        );
        self.ttl = ttl;
        self.mark_dirty();
    }

    /// `now - timestamp < ttl`
    pub fn is_valid(&self, timestamp: i64) -> bool {
        is_fresh(timestamp, self.clock.now_millis(), self.ttl)
    }

    /// Derives the table key for a request on `kind`.
    pub fn generate_key(kind: ResourceKind, params: Option<&QueryParams>) -> String {
        keys::generate_key(kind, params)
    }

    /// Stores `data` for `(kind, key)`, replacing any previous entry.
    ///
    /// A payload that cannot be represented as JSON is dropped with a
    /// warning; the cache never reports errors to its callers.
    pub fn set<T: Serialize + ?Sized>(&mut self, kind: ResourceKind, key: Option<&str>, data: &T) {
        match serde_json::to_value(data) {
            Ok(value) => self.set_value(kind, key, value),
            Err(e) => warn!(
                "Not caching {} payload for key {:?}: {}",
                kind.field_name(),
                key,
                e
            ),
        }
    }

    /// Stores an already-converted JSON payload for `(kind, key)`.
    pub fn set_value(&mut self, kind: ResourceKind, key: Option<&str>, data: Value) {
        let entry = CacheEntry::new(data, self.clock.now_millis());
        let table = self
            .tables
            .entry(kind)
            .or_insert_with(|| CacheTable::empty_for(kind));

        match table {
            CacheTable::Single(slot) => {
                if key.is_some() {
                    debug!("Ignoring key for single-value kind {}", kind.field_name());
                }
                *slot = Some(entry);
            }
            CacheTable::Keyed(entries) => {
                let key = resolve_key(kind, key);
                debug!("Caching {} entry: key={}", kind.field_name(), key);
                entries.insert(key, entry);
            }
        }

        self.mark_dirty();
    }

    /// Returns the cached payload when it exists and is younger than the
    /// store TTL.
    pub fn get<T: DeserializeOwned>(&self, kind: ResourceKind, key: Option<&str>) -> Option<T> {
        self.get_with_ttl(kind, key, self.ttl)
    }

    /// Like [`get`](Self::get) but validated against `ttl` instead of the
    /// store TTL.
    pub fn get_with_ttl<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        key: Option<&str>,
        ttl: Duration,
    ) -> Option<T> {
        let value = self.get_value_with_ttl(kind, key, ttl)?;
        match T::deserialize(value) {
            Ok(data) => Some(data),
            Err(e) => {
                debug!(
                    "Cached {} payload does not match requested type: {}",
                    kind.field_name(),
                    e
                );
                None
            }
        }
    }

    /// Borrowing variant of [`get`](Self::get) for raw JSON payloads.
    pub fn get_value(&self, kind: ResourceKind, key: Option<&str>) -> Option<&Value> {
        self.get_value_with_ttl(kind, key, self.ttl)
    }

    fn get_value_with_ttl(
        &self,
        kind: ResourceKind,
        key: Option<&str>,
        ttl: Duration,
    ) -> Option<&Value> {
        let entry = self.entry(kind, key)?;
        let now = self.clock.now_millis();
        if entry.is_valid_at(now, ttl) {
            debug!(
                "Cache hit for {}: age={}ms",
                kind.field_name(),
                entry.age_millis(now)
            );
            Some(entry.data())
        } else {
            debug!(
                "Cache entry for {} is stale: age={}ms, ttl={}ms",
                kind.field_name(),
                entry.age_millis(now),
                duration_millis(ttl)
            );
            None
        }
    }

    /// The stored entry for `(kind, key)`, whether or not it is still valid.
    pub fn entry(&self, kind: ResourceKind, key: Option<&str>) -> Option<&CacheEntry<Value>> {
        match self.tables.get(&kind)? {
            CacheTable::Single(slot) => slot.as_ref(),
            CacheTable::Keyed(entries) => entries.get(resolve_key(kind, key).as_str()),
        }
    }

    /// Empties every table. The TTL is kept.
    pub fn clear(&mut self) {
        let removed: usize = self.tables.values().map(CacheTable::len).sum();
        for table in self.tables.values_mut() {
            table.clear();
        }
        info!("Cleared cache '{}' ({} entries removed)", self.name, removed);
        self.mark_dirty();
    }

    /// True when the in-memory state has changed since it was last handed to
    /// the persistence writer. Stores without an adapter stay dirty after
    /// their first mutation.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_millis();
        let kinds = self
            .tables
            .iter()
            .map(|(kind, table)| KindStats {
                kind: *kind,
                entries: table.len(),
                valid: table
                    .entries()
                    .filter(|entry| entry.is_valid_at(now, self.ttl))
                    .count(),
            })
            .collect();

        CacheStats {
            store: self.name.clone(),
            ttl: self.ttl,
            kinds,
        }
    }

    /// Serialized form of the full state, as it would be persisted.
    pub fn snapshot(&self) -> String {
        match encode_state(self.ttl_millis(), &self.tables) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("Failed to serialize cache '{}': {}", self.name, e);
                String::new()
            }
        }
    }

    /// Waits until every queued persistence command has reached the adapter.
    pub async fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.flush().await;
        }
    }

    /// Removes the persisted blob. In-memory tables are left as they are.
    pub fn purge_persisted(&self) {
        match &self.writer {
            Some(writer) => {
                info!("Removing persisted cache '{}'", self.name);
                writer.remove();
            }
            None => debug!("Cache '{}' has no storage to purge", self.name),
        }
    }

    fn ttl_millis(&self) -> u64 {
        u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX)
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        let Some(writer) = &self.writer else {
            return;
        };
        match encode_state(self.ttl_millis(), &self.tables) {
            Ok(blob) => {
                writer.write(blob);
                self.dirty = false;
            }
            Err(e) => warn!("Failed to serialize cache '{}': {}", self.name, e),
        }
    }
}

fn resolve_key(kind: ResourceKind, key: Option<&str>) -> String {
    match key {
        Some(key) => key.to_string(),
        None => keys::generate_key(kind, None),
    }
}
