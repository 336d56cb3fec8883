//! Single-slot TTL cache for the last aggregated result.
//!
//! Expiry is computed on read; nothing is ever evicted, so an expired
//! snapshot stays available for the stale fallback path.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::news::types::TranslatedNewsItem;

/// One aggregated, translated result.
#[derive(Debug)]
pub struct Snapshot {
    items: Vec<TranslatedNewsItem>,
    fetched_at: DateTime<Utc>,
    stored_at: Instant,
}

impl Snapshot {
    fn new(items: Vec<TranslatedNewsItem>) -> Self {
        Self {
            items,
            fetched_at: Utc::now(),
            stored_at: Instant::now(),
        }
    }

    /// Items in feed order.
    pub fn items(&self) -> &[TranslatedNewsItem] {
        &self.items
    }

    /// Wall-clock time the snapshot was stored.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Time since the snapshot was stored.
    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }
}

/// Lifecycle of the cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing has been written yet.
    Empty,
    /// Written less than `ttl` ago.
    Fresh,
    /// Older than `ttl`; still readable through
    /// [`ResultCache::read_stale_allowed`].
    Stale,
}

/// Holds at most one [`Snapshot`].
#[derive(Debug)]
pub struct ResultCache {
    slot: RwLock<Option<Arc<Snapshot>>>,
    ttl: Duration,
}

impl ResultCache {
    /// Create an empty cache whose snapshots stay fresh for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
        }
    }

    /// Get the freshness window.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The current snapshot if it is younger than the TTL.
    pub fn read(&self) -> Option<Arc<Snapshot>> {
        self.read_stale_allowed()
            .filter(|snapshot| snapshot.age() < self.ttl)
    }

    /// The current snapshot regardless of age.
    pub fn read_stale_allowed(&self) -> Option<Arc<Snapshot>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Store `items` as the new snapshot, stamped with the current time.
    ///
    /// Readers see either the previous snapshot or this one.
    pub fn write(&self, items: Vec<TranslatedNewsItem>) -> Arc<Snapshot> {
        let snapshot = Arc::new(Snapshot::new(items));
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Classify the slot for logs and tests.
    pub fn state(&self) -> CacheState {
        match self.read_stale_allowed() {
            None => CacheState::Empty,
            Some(snapshot) if snapshot.age() < self.ttl => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }
}
