//! newsbridge - translated news relay
//!
//! Fetches a game news feed, translates each item into a target language,
//! and serves the result over HTTP behind a two-level cache.

pub mod config;
pub mod error;
pub mod logging;
pub mod news;
pub mod web;

pub use config::Config;
pub use error::{NewsError, Result};
pub use news::{
    start_news_updater, FeedClient, FeedError, GoogleTranslator, HttpFeedClient, NewsAggregator,
    RawNewsItem, RedisSnapshotStore, RefreshOutcome, Snapshot, SnapshotStore, StoreError,
    TranslatedNewsItem, TranslationError, Translator,
};
pub use web::{AppState, WebServer};
