//! Upstream news feed client.
//!
//! The feed is a single JSON POST endpoint; the request payload and headers
//! are fixed configuration, so every call sends the same request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::{FeedConfig, FeedRequestConfig};
use crate::news::types::RawNewsItem;

/// Errors raised while fetching the feed.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Client construction or invalid header configuration.
    #[error("invalid feed client configuration: {0}")]
    Client(String),

    /// The request could not be sent or the body not read.
    #[error("failed to fetch feed: {0}")]
    Request(String),

    /// Non-success status code.
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    /// Response larger than the configured limit.
    #[error("feed too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    /// Body is not JSON.
    #[error("malformed feed payload: {0}")]
    Malformed(String),
}

/// Source of raw news items.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetch the current item list with exactly one upstream call.
    async fn fetch_raw(&self) -> Result<Vec<RawNewsItem>, FeedError>;
}

/// HTTP client for the feed endpoint.
pub struct HttpFeedClient {
    client: Client,
    url: String,
    request: FeedRequestConfig,
    max_response_bytes: u64,
}

impl HttpFeedClient {
    /// Create a client with the fixed headers from configuration.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .default_headers(build_headers(config)?)
            .build()
            .map_err(|e| FeedError::Client(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            request: config.request.clone(),
            max_response_bytes: config.max_response_bytes,
        })
    }
}

fn build_headers(config: &FeedConfig) -> Result<HeaderMap, FeedError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json;charset=utf-8"),
    );

    let fixed = [
        ("x-areaid", &config.area_id),
        ("x-gameid", &config.request.gameid),
        ("x-language", &config.header_language),
        ("x-source", &config.source),
    ];
    for (name, value) in fixed {
        let value = HeaderValue::from_str(value)
            .map_err(|e| FeedError::Client(format!("invalid value for {name}: {e}")))?;
        headers.insert(HeaderName::from_static(name), value);
    }

    Ok(headers)
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch_raw(&self) -> Result<Vec<RawNewsItem>, FeedError> {
        // Serialized by hand so the configured content type is kept as-is
        let payload = serde_json::to_vec(&self.request)
            .map_err(|e| FeedError::Client(format!("failed to encode request: {e}")))?;

        let response = self
            .client
            .post(&self.url)
            .body(payload)
            .send()
            .await
            .map_err(|e| FeedError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_response_bytes {
                return Err(FeedError::TooLarge {
                    size: content_length,
                    max: self.max_response_bytes,
                });
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FeedError::Request(format!("failed to read response: {e}")))?;

        if bytes.len() as u64 > self.max_response_bytes {
            return Err(FeedError::TooLarge {
                size: bytes.len() as u64,
                max: self.max_response_bytes,
            });
        }

        let items = parse_feed(&bytes)?;
        debug!(count = items.len(), "Fetched feed");
        Ok(items)
    }
}

/// Extract the items at `data.info_content`.
///
/// A missing or non-array `info_content` is an empty feed, and entries that
/// are not objects are skipped. Only a body that is not JSON at all is an
/// error.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawNewsItem>, FeedError> {
    let payload: Value =
        serde_json::from_slice(bytes).map_err(|e| FeedError::Malformed(e.to_string()))?;

    let entries = match payload.pointer("/data/info_content") {
        Some(Value::Array(entries)) => entries.clone(),
        _ => return Ok(Vec::new()),
    };

    Ok(entries
        .into_iter()
        .filter_map(RawNewsItem::from_value)
        .collect())
}
