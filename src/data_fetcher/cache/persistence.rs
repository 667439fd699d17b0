//! Encoding of the cache state into a persisted blob, and the background
//! writer that hands blobs to the storage adapter.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::storage::StorageAdapter;
use super::types::{CacheEntry, CacheTable};
use crate::constants::persistence::{DOCUMENT_VERSION, TTL_FIELD};
use crate::data_fetcher::models::ResourceKind;
use crate::error::AppError;

/// State recovered from a persisted blob
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredState {
    pub ttl_millis: Option<u64>,
    pub tables: BTreeMap<ResourceKind, CacheTable>,
}

#[derive(Deserialize)]
struct PersistedDocument {
    state: Map<String, Value>,
    #[serde(default)]
    version: u32,
}

/// Serializes the full cache state.
///
/// Keyed tables become arrays of `[key, entry]` pairs, single-value tables
/// become the entry itself or `null`.
pub fn encode_state(
    ttl_millis: u64,
    tables: &BTreeMap<ResourceKind, CacheTable>,
) -> Result<String, AppError> {
    let mut state = Map::new();
    state.insert(TTL_FIELD.to_string(), Value::from(ttl_millis));

    for (kind, table) in tables {
        let value = match table {
            CacheTable::Single(entry) => serde_json::to_value(entry)?,
            CacheTable::Keyed(entries) => {
                let pairs: Vec<(&String, &CacheEntry<Value>)> = entries.iter().collect();
                serde_json::to_value(pairs)?
            }
        };
        state.insert(kind.field_name().to_string(), value);
    }

    let document = serde_json::json!({
        "state": state,
        "version": DOCUMENT_VERSION,
    });
    Ok(document.to_string())
}

/// Parses a persisted blob back into tables.
///
/// Kinds missing from the document come back empty. Any malformed field or
/// an unknown document version rejects the whole blob.
pub fn decode_state(blob: &str) -> Result<RestoredState, AppError> {
    let malformed = |e: serde_json::Error| {
        AppError::storage_error(format!("Malformed cache document: {e}"))
    };

    let mut document: PersistedDocument = serde_json::from_str(blob).map_err(malformed)?;
    if document.version != DOCUMENT_VERSION {
        return Err(AppError::storage_error(format!(
            "Unsupported cache document version {}",
            document.version
        )));
    }

    let ttl_millis = match document.state.remove(TTL_FIELD) {
        None | Some(Value::Null) => None,
        Some(value) => Some(serde_json::from_value::<u64>(value).map_err(malformed)?),
    };

    let mut tables = BTreeMap::new();
    for kind in ResourceKind::ALL {
        let table = match document.state.remove(kind.field_name()) {
            None | Some(Value::Null) => CacheTable::empty_for(kind),
            Some(value) if kind.is_keyed() => {
                let pairs: Vec<(String, Value)> =
                    serde_json::from_value(value).map_err(malformed)?;
                let entries = pairs
                    .into_iter()
                    .map(|(key, entry)| Ok((key, decode_entry(kind, entry)?)))
                    .collect::<Result<BTreeMap<_, _>, AppError>>()?;
                CacheTable::Keyed(entries)
            }
            Some(value) => CacheTable::Single(Some(decode_entry(kind, value)?)),
        };
        tables.insert(kind, table);
    }

    if !document.state.is_empty() {
        let ignored: Vec<&String> = document.state.keys().collect();
        debug!("Ignoring unknown fields in cache document: {:?}", ignored);
    }

    Ok(RestoredState { ttl_millis, tables })
}

/// Entries are persisted as `{"data": .., "timestamp": ..}` objects only.
/// Serde would also accept a `[data, timestamp]` sequence, which is not a
/// shape this store ever writes.
fn decode_entry(kind: ResourceKind, value: Value) -> Result<CacheEntry<Value>, AppError> {
    if !value.is_object() {
        return Err(AppError::storage_error(format!(
            "Malformed cache document: entry for '{}' is not an object",
            kind.field_name()
        )));
    }
    serde_json::from_value(value)
        .map_err(|e| AppError::storage_error(format!("Malformed cache document: {e}")))
}

enum PersistCommand {
    Write(String),
    Remove,
    Flush(oneshot::Sender<()>),
}

/// Handle to the background task that owns all adapter writes for one store.
///
/// Commands run in the order they were queued. Back-to-back writes are
/// collapsed into the newest one.
#[derive(Debug)]
pub(super) struct PersistenceWriter {
    tx: mpsc::UnboundedSender<PersistCommand>,
}

impl PersistenceWriter {
    /// Spawns the writer task. Must be called inside a tokio runtime.
    pub(super) fn spawn(name: String, adapter: Arc<dyn StorageAdapter>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(name, adapter, rx));
        Self { tx }
    }

    pub(super) fn write(&self, blob: String) {
        if self.tx.send(PersistCommand::Write(blob)).is_err() {
            warn!("Cache persistence writer has stopped; dropping write");
        }
    }

    pub(super) fn remove(&self) {
        if self.tx.send(PersistCommand::Remove).is_err() {
            warn!("Cache persistence writer has stopped; dropping remove");
        }
    }

    /// Resolves once every command queued before it has been handled.
    pub(super) async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run_writer(
    name: String,
    adapter: Arc<dyn StorageAdapter>,
    mut rx: mpsc::UnboundedReceiver<PersistCommand>,
) {
    let mut next: Option<PersistCommand> = None;

    loop {
        let command = match next.take() {
            Some(command) => command,
            None => match rx.recv().await {
                Some(command) => command,
                None => break,
            },
        };

        match command {
            PersistCommand::Write(mut blob) => {
                let mut collapsed = 0usize;
                while let Ok(queued) = rx.try_recv() {
                    match queued {
                        PersistCommand::Write(newer) => {
                            blob = newer;
                            collapsed += 1;
                        }
                        other => {
                            next = Some(other);
                            break;
                        }
                    }
                }
                if collapsed > 0 {
                    debug!("Collapsed {collapsed} queued cache writes for '{name}'");
                }
                match adapter.set(&name, &blob).await {
                    Ok(()) => debug!("Persisted cache '{}' ({} bytes)", name, blob.len()),
                    Err(e) => warn!("Failed to persist cache '{}': {}", name, e),
                }
            }
            PersistCommand::Remove => match adapter.remove(&name).await {
                Ok(()) => debug!("Removed persisted cache '{name}'"),
                Err(e) => warn!("Failed to remove persisted cache '{}': {}", name, e),
            },
            PersistCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    debug!("Cache persistence writer for '{name}' finished");
}
