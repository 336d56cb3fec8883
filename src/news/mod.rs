//! News relay core.
//!
//! Fetches the upstream feed, translates each item into the deployment's
//! target language, and caches at two levels: the whole translated result
//! (TTL-bounded, single slot) and each item's translation (keyed by a
//! content signature, kept for the process lifetime).

pub mod aggregator;
pub mod feed;
pub mod pipeline;
pub mod result_cache;
pub mod signature;
pub mod store;
pub mod translation_cache;
pub mod translator;
pub mod types;
pub mod updater;

pub use aggregator::{NewsAggregator, RefreshOutcome};
pub use feed::{parse_feed, FeedClient, FeedError, HttpFeedClient};
pub use pipeline::{ItemOutcome, ItemTranslationPipeline};
pub use result_cache::{CacheState, ResultCache, Snapshot};
pub use signature::ContentSignature;
pub use store::{RedisSnapshotStore, SnapshotStore, StoreError};
pub use translation_cache::TranslationCache;
pub use translator::{GoogleTranslator, TranslationError, Translator, MAX_TEXT_CHARS};
pub use types::{
    RawNewsItem, TranslatedNewsItem, TranslatedPair, CONTENT_PLACEHOLDER,
    DEFAULT_CACHE_DURATION_SECS,
};
pub use updater::{start_news_updater, NewsUpdater};
