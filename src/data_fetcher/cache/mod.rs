pub mod clock;
pub mod keys;
pub mod persistence;
pub mod storage;
pub mod store;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use keys::{NO_PARAMS_FINGERPRINT, generate_key};
pub use persistence::{RestoredState, decode_state, encode_state};
pub use storage::{FileStorage, MemoryStorage, StorageAdapter};
pub use store::CacheStore;
pub use types::{CacheEntry, CacheStats, CacheTable, KindStats, is_fresh};
