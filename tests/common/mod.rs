//! Test helpers for integration tests.
//!
//! Provides scripted stand-ins for the upstream feed and the translation
//! provider, plus builders for aggregators and routers wired to them.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use newsbridge::config::{CacheConfig, RefreshConfig, TranslationConfig};
use newsbridge::web::{create_health_router, create_router, AppState};
use newsbridge::{
    FeedClient, FeedError, NewsAggregator, RawNewsItem, TranslationError, Translator,
};

/// Secret used by tests that exercise the refresh trigger.
pub const TEST_SECRET: &str = "test-refresh-secret";

/// Default result cache TTL in tests.
pub const TEST_TTL_SECS: u64 = 600;

/// Build a raw feed item as JSON.
pub fn news_item(id: u64, title: &str, body: &str) -> Value {
    json!({
        "content_id": id,
        "title": title,
        "content_part": body,
        "pic_urls": [format!("https://cdn.example.com/{id}.jpg")],
    })
}

/// Translator that appends `-<target>` to its input.
///
/// Records call counts and the peak number of concurrent calls; can be told
/// to fail on specific inputs or to take a while to answer.
#[derive(Default)]
pub struct MockTranslator {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fail_on: Mutex<HashSet<String>>,
    latency: Mutex<Duration>,
    latency_for: Mutex<HashMap<String, Duration>>,
}

impl MockTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_latency(latency: Duration) -> Arc<Self> {
        let translator = Self::default();
        *translator.latency.lock().unwrap() = latency;
        Arc::new(translator)
    }

    pub fn fail_on(&self, text: &str) {
        self.fail_on.lock().unwrap().insert(text.to_string());
    }

    /// Override the latency for one input.
    pub fn set_latency_for(&self, text: &str, latency: Duration) {
        self.latency_for
            .lock()
            .unwrap()
            .insert(text.to_string(), latency);
    }

    pub fn clear_failures(&self) {
        self.fail_on.lock().unwrap().clear();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = self
            .latency_for
            .lock()
            .unwrap()
            .get(text)
            .copied()
            .unwrap_or_else(|| *self.latency.lock().unwrap());
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_on.lock().unwrap().contains(text) {
            return Err(TranslationError::Status(503));
        }
        Ok(format!("{text}-{target_lang}"))
    }
}

/// Feed whose next answer is set by the test.
pub struct ScriptedFeed {
    response: Mutex<Result<Vec<Value>, u16>>,
    calls: AtomicUsize,
    latency: Mutex<Duration>,
}

impl ScriptedFeed {
    pub fn new(items: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Ok(items)),
            calls: AtomicUsize::new(0),
            latency: Mutex::new(Duration::ZERO),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        let feed = Self::new(Vec::new());
        feed.set_failure(status);
        feed
    }

    pub fn set_items(&self, items: Vec<Value>) {
        *self.response.lock().unwrap() = Ok(items);
    }

    pub fn set_failure(&self, status: u16) {
        *self.response.lock().unwrap() = Err(status);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedClient for ScriptedFeed {
    async fn fetch_raw(&self) -> Result<Vec<RawNewsItem>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let response = self.response.lock().unwrap().clone();
        match response {
            Ok(items) => Ok(items.into_iter().filter_map(RawNewsItem::from_value).collect()),
            Err(status) => Err(FeedError::Status(status)),
        }
    }
}

/// Translation settings for tests: Turkish target, short timeout.
pub fn translation_config(max_concurrent_items: usize) -> TranslationConfig {
    TranslationConfig {
        target_language: "tr".to_string(),
        call_timeout_secs: 2,
        max_concurrent_items,
        ..Default::default()
    }
}

pub fn cache_config(ttl_secs: u64) -> CacheConfig {
    CacheConfig {
        duration_secs: ttl_secs,
        ..Default::default()
    }
}

/// Build an aggregator over the given stand-ins.
pub fn build_aggregator(
    feed: Arc<ScriptedFeed>,
    translator: Arc<MockTranslator>,
    max_concurrent_items: usize,
) -> Arc<NewsAggregator> {
    Arc::new(NewsAggregator::new(
        feed,
        translator,
        &translation_config(max_concurrent_items),
        &cache_config(TEST_TTL_SECS),
    ))
}

/// Build the full router (API plus health check) around an aggregator.
pub fn build_router(aggregator: Arc<NewsAggregator>, refresh: &RefreshConfig) -> axum::Router {
    let state = Arc::new(AppState::new(aggregator, refresh));
    create_router(state, &[]).merge(create_health_router())
}

/// Refresh settings carrying [`TEST_SECRET`].
pub fn refresh_config(rate_limit_per_minute: u32) -> RefreshConfig {
    RefreshConfig {
        secret: TEST_SECRET.to_string(),
        rate_limit_per_minute,
        ..Default::default()
    }
}
