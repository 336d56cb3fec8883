//! API handlers.

pub mod news;

pub use news::*;

use std::sync::Arc;

use crate::config::RefreshConfig;
use crate::news::NewsAggregator;

use super::middleware::{RefreshRateLimiter, RefreshSecret};

/// Application state shared across handlers.
pub struct AppState {
    /// The news pipeline.
    pub aggregator: Arc<NewsAggregator>,
    /// Secret guarding the refresh trigger.
    pub refresh_secret: RefreshSecret,
    /// Limiter for forced refreshes.
    pub refresh_limiter: RefreshRateLimiter,
    /// Precomputed `Cache-Control` value for the news endpoints.
    pub cache_control: String,
}

impl AppState {
    /// Create the state from the aggregator and refresh settings.
    pub fn new(aggregator: Arc<NewsAggregator>, refresh: &RefreshConfig) -> Self {
        let ttl = aggregator.results().ttl().as_secs();
        Self {
            aggregator,
            refresh_secret: RefreshSecret::new(&refresh.secret),
            refresh_limiter: RefreshRateLimiter::per_minute(refresh.rate_limit_per_minute),
            cache_control: format!("public, s-maxage={}, stale-while-revalidate", ttl),
        }
    }
}
