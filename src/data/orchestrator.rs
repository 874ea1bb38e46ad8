//! Cache-backed fetching: check cache, fetch if stale, extract, store, return

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use super::client::Fetcher;
use super::sources::Source;
use crate::cache::{now_epoch_secs, ConfigStore};
use crate::error::FetchError;
use crate::extract::{apply_first, Record};

/// Freshness of a cache entry at a point in time
#[derive(Debug, Clone, PartialEq)]
pub enum CacheState {
    /// Entry is within its TTL; no network call needed
    Fresh(Record),
    /// Entry is expired, missing or unreadable
    StaleOrAbsent,
}

/// Coordinates the config store and a fetcher for one cache key at a time
///
/// Each call makes at most one attempt per source; there is no retry loop.
/// Status lines are re-run on every refresh, so a failed call heals on the
/// next invocation.
#[derive(Debug, Clone)]
pub struct Orchestrator<F> {
    fetcher: F,
    store: ConfigStore,
}

impl<F: Fetcher> Orchestrator<F> {
    /// Creates an orchestrator over `fetcher` and `store`
    pub fn new(fetcher: F, store: ConfigStore) -> Self {
        Self { fetcher, store }
    }

    /// The underlying config store
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// The underlying fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Classifies the cache entry for `key` at time `now`
    pub fn state(&self, key: &str, now: f64) -> CacheState {
        match self.store.read_entry(key) {
            Some(entry) if entry.is_fresh_at(now) => CacheState::Fresh(entry.data),
            _ => CacheState::StaleOrAbsent,
        }
    }

    /// Returns the record for `key`, fetching only when the cache is stale
    ///
    /// # Returns
    /// * `Some(Record)` from a fresh cache entry or a successful fetch
    /// * `None` if the fetch failed; the cache is left untouched
    pub async fn get(&self, key: &str, sources: &[Source], credential: &str) -> Option<Record> {
        if let CacheState::Fresh(data) = self.state(key, now_epoch_secs()) {
            debug!(key, "cache fresh");
            return Some(data);
        }

        self.refresh(key, sources, credential).await
    }

    /// Fetches and stores the record for `key` regardless of cache freshness
    pub async fn refresh(&self, key: &str, sources: &[Source], credential: &str) -> Option<Record> {
        match self.fetch_and_store(key, sources, credential).await {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(key, error = %e, "no data available");
                None
            }
        }
    }

    /// Fetches from all `sources` concurrently and caches the preferred success
    ///
    /// A failure to write the cache is logged; the fetched record is still
    /// returned.
    pub async fn fetch_and_store(
        &self,
        key: &str,
        sources: &[Source],
        credential: &str,
    ) -> Result<Record, FetchError> {
        let record = self.fetch_any(sources, credential).await?;

        if let Err(e) = self.store.write_entry(key, record.clone(), now_epoch_secs()) {
            warn!(key, error = %e, "failed to write cache entry");
        }

        Ok(record)
    }

    /// Issues every source at once and returns the success of the highest
    /// priority source that did not fail
    ///
    /// A lower-priority success is held back until every source ahead of it
    /// has failed.
    async fn fetch_any(&self, sources: &[Source], credential: &str) -> Result<Record, FetchError> {
        let mut pending: FuturesUnordered<_> = sources
            .iter()
            .enumerate()
            .map(|(index, source)| async move {
                (index, self.fetch_source(source, credential).await)
            })
            .collect();

        let mut outcomes: Vec<Option<Result<Record, FetchError>>> =
            sources.iter().map(|_| None).collect();
        let mut next = 0;
        let mut last_error = None;

        while let Some((index, outcome)) = pending.next().await {
            outcomes[index] = Some(outcome);

            while let Some(slot) = outcomes.get_mut(next) {
                match slot.take() {
                    Some(Ok(record)) => return Ok(record),
                    Some(Err(e)) => {
                        last_error = Some(e);
                        next += 1;
                    }
                    None => break,
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::NotFound("no sources configured".to_string())))
    }

    async fn fetch_source(&self, source: &Source, credential: &str) -> Result<Record, FetchError> {
        let body = self
            .fetcher
            .get(&source.path, &source.accept, credential)
            .await
            .map_err(|e| {
                debug!(source = %source.name, error = %e, "request failed");
                e
            })?;

        let (strategy, record) = apply_first(&source.strategies, &body)?;
        debug!(source = %source.name, strategy, "record extracted");
        Ok(record)
    }
}
