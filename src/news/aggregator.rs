//! Feed aggregation: fetch, translate every item, cache the result.
//!
//! [`NewsAggregator`] owns both cache tiers. A pass fetches the feed once,
//! runs the item pipeline over all items with bounded concurrency (output
//! order always matches feed order), then replaces the result snapshot and
//! writes it through to the optional external store.
//!
//! When the feed cannot be fetched, the previous snapshot is served as-is.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::{CacheConfig, TranslationConfig};
use crate::news::feed::FeedClient;
use crate::news::pipeline::{ItemOutcome, ItemTranslationPipeline};
use crate::news::result_cache::{ResultCache, Snapshot};
use crate::news::signature::ContentSignature;
use crate::news::store::{SnapshotStore, StoreError};
use crate::news::translation_cache::TranslationCache;
use crate::news::translator::Translator;
use crate::news::types::{RawNewsItem, TranslatedNewsItem};

/// Result of one aggregation pass.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The feed was fetched and a new snapshot stored.
    Fresh(Arc<Snapshot>),
    /// The feed failed; this is the previous snapshot.
    Stale(Arc<Snapshot>),
    /// The feed failed and nothing was ever stored.
    Empty,
}

impl RefreshOutcome {
    /// Whether the pass stored a new snapshot.
    pub fn is_fresh(&self) -> bool {
        matches!(self, RefreshOutcome::Fresh(_))
    }

    /// Snapshot being served, if any.
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            RefreshOutcome::Fresh(s) | RefreshOutcome::Stale(s) => Some(s),
            RefreshOutcome::Empty => None,
        }
    }

    /// Consume the outcome, keeping the served snapshot.
    pub fn into_snapshot(self) -> Option<Arc<Snapshot>> {
        match self {
            RefreshOutcome::Fresh(s) | RefreshOutcome::Stale(s) => Some(s),
            RefreshOutcome::Empty => None,
        }
    }

    /// Items to serve for this outcome (empty for [`RefreshOutcome::Empty`]).
    pub fn items(&self) -> &[TranslatedNewsItem] {
        self.snapshot().map(|s| s.items()).unwrap_or_default()
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            RefreshOutcome::Fresh(_) => "fresh",
            RefreshOutcome::Stale(_) => "stale",
            RefreshOutcome::Empty => "empty",
        }
    }
}

/// Orchestrates the feed client, the item pipeline and both caches.
pub struct NewsAggregator {
    feed: Arc<dyn FeedClient>,
    pipeline: ItemTranslationPipeline,
    results: ResultCache,
    store: Option<Arc<dyn SnapshotStore>>,
    store_key: String,
    max_concurrent_items: usize,
    /// Held for the duration of a coalesced pass; keeps that pass's outcome.
    last_pass: Mutex<RefreshOutcome>,
    /// Number of completed coalesced passes.
    passes: AtomicU64,
}

impl NewsAggregator {
    /// Create an aggregator with fresh, empty caches.
    pub fn new(
        feed: Arc<dyn FeedClient>,
        translator: Arc<dyn Translator>,
        translation: &TranslationConfig,
        cache: &CacheConfig,
    ) -> Self {
        let pipeline = ItemTranslationPipeline::new(
            translator,
            Arc::new(TranslationCache::new()),
            translation.target_language.clone(),
            Duration::from_secs(translation.call_timeout_secs),
        );

        Self {
            feed,
            pipeline,
            results: ResultCache::new(Duration::from_secs(cache.duration_secs)),
            store: None,
            store_key: cache.store_key.clone(),
            max_concurrent_items: translation.max_concurrent_items.max(1),
            last_pass: Mutex::new(RefreshOutcome::Empty),
            passes: AtomicU64::new(0),
        }
    }

    /// Write every fresh snapshot through to `store`.
    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Get the result cache.
    pub fn results(&self) -> &ResultCache {
        &self.results
    }

    /// Get the translation cache.
    pub fn translation_cache(&self) -> &TranslationCache {
        self.pipeline.cache()
    }

    /// Serve the current news.
    ///
    /// Returns the cached snapshot while it is fresh; otherwise runs (or
    /// joins) a refresh. `None` only if no fetch has ever succeeded.
    ///
    /// The pass runs on its own task, so a reader dropped mid-pass does not
    /// cancel work that other readers are waiting on.
    pub async fn news(self: &Arc<Self>) -> Option<Arc<Snapshot>> {
        if let Some(snapshot) = self.results.read() {
            debug!("Result cache hit");
            return Some(snapshot);
        }

        let aggregator = Arc::clone(self);
        match tokio::spawn(async move { aggregator.coalesced_pass(true).await }).await {
            Ok(outcome) => outcome.into_snapshot(),
            Err(e) => {
                error!(error = %e, "Aggregation task failed");
                self.results.read_stale_allowed()
            }
        }
    }

    /// Force an aggregation pass.
    ///
    /// Callers that arrive while a pass is already running wait for it and
    /// receive its outcome instead of starting another one.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.coalesced_pass(false).await
    }

    async fn coalesced_pass(&self, reuse_fresh: bool) -> RefreshOutcome {
        let seen = self.passes.load(Ordering::SeqCst);
        let mut last_pass = self.last_pass.lock().await;

        if self.passes.load(Ordering::SeqCst) != seen {
            debug!("Sharing the outcome of a concurrent refresh");
            return last_pass.clone();
        }
        if reuse_fresh {
            if let Some(snapshot) = self.results.read() {
                return RefreshOutcome::Fresh(snapshot);
            }
        }

        let outcome = self.aggregate().await;
        *last_pass = outcome.clone();
        self.passes.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    /// Run one aggregation pass without coalescing.
    pub async fn aggregate(&self) -> RefreshOutcome {
        let raw_items = match self.feed.fetch_raw().await {
            Ok(items) => items,
            Err(e) => {
                return match self.results.read_stale_allowed() {
                    Some(snapshot) => {
                        warn!(
                            error = %e,
                            age_secs = snapshot.age().as_secs(),
                            "Feed unavailable, serving previous result"
                        );
                        RefreshOutcome::Stale(snapshot)
                    }
                    None => {
                        warn!(error = %e, "Feed unavailable and no previous result");
                        RefreshOutcome::Empty
                    }
                };
            }
        };

        // Items sharing content are translated once per pass
        let signatures: Vec<ContentSignature> = raw_items
            .iter()
            .map(|raw| ContentSignature::compute(raw.title(), raw.body()))
            .collect();
        let mut first_seen: HashMap<ContentSignature, usize> = HashMap::new();
        let mut unique: Vec<&RawNewsItem> = Vec::new();
        for (raw, signature) in raw_items.iter().zip(&signatures) {
            first_seen.entry(*signature).or_insert_with(|| {
                unique.push(raw);
                unique.len() - 1
            });
        }

        let pending: Vec<_> = unique
            .into_iter()
            .map(|raw| self.pipeline.process(raw))
            .collect();
        let mut processed: Vec<Option<(TranslatedNewsItem, ItemOutcome)>> =
            stream::iter(pending)
                .buffered(self.max_concurrent_items)
                .map(Some)
                .collect()
                .await;

        let (mut cached, mut translated, mut fallback) = (0usize, 0usize, 0usize);
        let mut items = Vec::with_capacity(raw_items.len());
        for (raw, signature) in raw_items.iter().zip(&signatures) {
            let slot = first_seen.get(signature).copied().unwrap_or_default();
            let (item, outcome) = match processed.get_mut(slot).and_then(Option::take) {
                Some(result) => result,
                None => self.reuse_in_pass(raw, signature),
            };
            match outcome {
                ItemOutcome::Cached => cached += 1,
                ItemOutcome::Translated => translated += 1,
                ItemOutcome::Fallback => fallback += 1,
            }
            items.push(item);
        }

        let snapshot = self.results.write(items);
        info!(
            items = snapshot.items().len(),
            cached,
            translated,
            fallback,
            language = self.pipeline.target_language(),
            "Aggregated news"
        );

        if let Err(e) = self.write_through(&snapshot).await {
            warn!(error = %e, key = %self.store_key, "Failed to write result to store");
        }

        RefreshOutcome::Fresh(snapshot)
    }

    /// Result for a repeat of an item already processed in this pass.
    fn reuse_in_pass(
        &self,
        raw: &RawNewsItem,
        signature: &ContentSignature,
    ) -> (TranslatedNewsItem, ItemOutcome) {
        match self.translation_cache().get(signature) {
            Some(pair) => (TranslatedNewsItem::translated(raw, &pair), ItemOutcome::Cached),
            None => (TranslatedNewsItem::fallback(raw), ItemOutcome::Fallback),
        }
    }

    async fn write_through(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let value = serde_json::to_string(snapshot.items())
            .map_err(|e| StoreError::Encode(e.to_string()))?;
        store.set(&self.store_key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::feed::FeedError;
    use crate::news::translator::TranslationError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Mutex as StdMutex;

    struct StaticFeed {
        items: Vec<serde_json::Value>,
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FeedClient for StaticFeed {
        async fn fetch_raw(&self) -> Result<Vec<RawNewsItem>, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(FeedError::Status(503));
            }
            Ok(self
                .items
                .iter()
                .cloned()
                .filter_map(RawNewsItem::from_value)
                .collect())
        }
    }

    struct Upper;

    #[async_trait]
    impl Translator for Upper {
        async fn translate(&self, text: &str, _target: &str) -> Result<String, TranslationError> {
            Ok(text.to_uppercase())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl SnapshotStore for FailingStore {
        async fn set(&self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::Write("unavailable".to_string()))
        }
    }

    /// Keeps every write.
    #[derive(Default)]
    struct RecordingStore {
        writes: StdMutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SnapshotStore for RecordingStore {
        async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
            self.writes.lock().unwrap().push((key.to_string(), value));
            Ok(())
        }
    }

    fn aggregator(feed: StaticFeed) -> NewsAggregator {
        NewsAggregator::new(
            Arc::new(feed),
            Arc::new(Upper),
            &TranslationConfig::default(),
            &CacheConfig::default(),
        )
    }

    fn feed(items: Vec<serde_json::Value>, fail: bool) -> StaticFeed {
        StaticFeed {
            items,
            fail: AtomicBool::new(fail),
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_aggregate_translates_all_items() {
        let agg = aggregator(feed(
            vec![
                json!({"title": "a", "content_part": "x"}),
                json!({"title": "b", "content_desc": "y"}),
            ],
            false,
        ));

        let outcome = agg.aggregate().await;

        assert!(outcome.is_fresh());
        assert_eq!(outcome.label(), "fresh");
        let titles: Vec<_> = outcome.items().iter().map(|i| i.title()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(outcome.items()[1].content_tr(), "Y");
        assert_eq!(agg.translation_cache().len(), 2);
    }

    #[tokio::test]
    async fn test_aggregate_without_previous_result() {
        let agg = aggregator(feed(vec![], true));

        let outcome = agg.aggregate().await;

        assert!(matches!(outcome, RefreshOutcome::Empty));
        assert!(outcome.items().is_empty());
        assert!(agg.results().read_stale_allowed().is_none());
    }

    #[tokio::test]
    async fn test_empty_feed_is_a_fresh_result() {
        let agg = aggregator(feed(vec![], false));

        let outcome = agg.aggregate().await;

        assert!(outcome.is_fresh());
        assert!(outcome.items().is_empty());
        assert!(agg.results().read().is_some());
    }

    #[tokio::test]
    async fn test_store_failure_does_not_fail_pass() {
        let agg = aggregator(feed(vec![json!({"title": "a"})], false))
            .with_store(Arc::new(FailingStore));

        let outcome = agg.aggregate().await;

        assert!(outcome.is_fresh());
        assert_eq!(outcome.items().len(), 1);
    }

    #[tokio::test]
    async fn test_news_uses_cache_while_fresh() {
        let source = Arc::new(feed(vec![json!({"title": "a"})], false));
        let agg = Arc::new(NewsAggregator::new(
            source.clone(),
            Arc::new(Upper),
            &TranslationConfig::default(),
            &CacheConfig::default(),
        ));

        let first = agg.news().await.unwrap();
        let second = agg.news().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_always_fetches() {
        let source = Arc::new(feed(vec![json!({"title": "a"})], false));
        let agg = Arc::new(NewsAggregator::new(
            source.clone(),
            Arc::new(Upper),
            &TranslationConfig::default(),
            &CacheConfig::default(),
        ));

        agg.news().await;
        let outcome = agg.refresh().await;

        assert!(outcome.is_fresh());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrency_floor() {
        let translation = TranslationConfig {
            max_concurrent_items: 0,
            ..TranslationConfig::default()
        };
        let agg = NewsAggregator::new(
            Arc::new(feed(vec![], false)),
            Arc::new(Upper),
            &translation,
            &CacheConfig::default(),
        );
        assert_eq!(agg.max_concurrent_items, 1);
    }

    #[tokio::test]
    async fn test_fresh_pass_writes_items_to_store() {
        let source = Arc::new(feed(vec![json!({"title": "t", "content_part": "b"})], false));
        let store = Arc::new(RecordingStore::default());
        let agg = NewsAggregator::new(
            source.clone(),
            Arc::new(Upper),
            &TranslationConfig::default(),
            &CacheConfig::default(),
        )
        .with_store(store.clone());

        let outcome = agg.aggregate().await;
        assert!(outcome.is_fresh());

        // A failed fetch serves the stale result without writing it again
        source.fail.store(true, Ordering::SeqCst);
        let stale = agg.aggregate().await;
        assert_eq!(stale.label(), "stale");

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        let (key, value) = &writes[0];
        assert_eq!(key, "news");
        let stored: Vec<TranslatedNewsItem> = serde_json::from_str(value).unwrap();
        assert_eq!(stored, outcome.items());
        assert_eq!(stored[0].title(), "T");
    }

    #[tokio::test]
    async fn test_empty_pass_does_not_write_to_store() {
        let store = Arc::new(RecordingStore::default());
        let agg = aggregator(feed(vec![], true)).with_store(store.clone());

        let outcome = agg.aggregate().await;

        assert!(matches!(outcome, RefreshOutcome::Empty));
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_key_comes_from_config() {
        let store = Arc::new(RecordingStore::default());
        let cache = CacheConfig {
            store_key: "news:tr".to_string(),
            ..CacheConfig::default()
        };
        let agg = NewsAggregator::new(
            Arc::new(feed(vec![json!({"title": "t"})], false)),
            Arc::new(Upper),
            &TranslationConfig::default(),
            &cache,
        )
        .with_store(store.clone());

        agg.aggregate().await;

        assert_eq!(store.writes.lock().unwrap()[0].0, "news:tr");
    }
}
