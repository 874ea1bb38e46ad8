//! Config store shared by every invocation of the status line
//!
//! A single JSON file holds both timestamped cache entries (`credits_cache`,
//! `usage_cache`) and unrelated settings such as the saved session cookie.
//! Updates are read-merge-write so a process refreshing one entry never erases
//! fields written by another. There is no lock: two overlapping writers can
//! lose one update, which the next invocation repairs by refetching.

mod store;

pub use store::{now_epoch_secs, CacheEntry, ConfigStore, CACHE_TTL_SECS};
