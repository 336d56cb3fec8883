//! Configuration module for newsbridge.
//!
//! Everything is read once at startup from a TOML file; environment
//! variables can override the secrets and the deployment language.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{NewsError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty = any origin).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// One entry of the feed's `sort_by_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Field to sort on.
    pub key: String,
    /// 1 for ascending, 0 for descending.
    pub asc: u8,
}

/// Fixed JSON payload sent to the feed endpoint.
///
/// Field names match the upstream wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedRequestConfig {
    #[serde(default = "default_feed_languages")]
    pub language: Vec<String>,
    #[serde(default = "default_game_id")]
    pub gameid: String,
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_get_num")]
    pub get_num: u32,
    #[serde(default = "default_ext_info_types")]
    pub ext_info_type_list: Vec<u32>,
    #[serde(default = "default_secondary_label")]
    pub secondary_label_id: u64,
    #[serde(default = "default_primary_label")]
    pub primary_label_id: u64,
    #[serde(default = "default_sort_by")]
    pub sort_by_list: Vec<SortKey>,
    #[serde(default)]
    pub use_default_language: bool,
}

fn default_feed_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_game_id() -> String {
    "30048".to_string()
}

fn default_get_num() -> u32 {
    10
}

fn default_ext_info_types() -> Vec<u32> {
    vec![0, 1, 2]
}

fn default_secondary_label() -> u64 {
    1317
}

fn default_primary_label() -> u64 {
    893
}

fn default_sort_by() -> Vec<SortKey> {
    vec![SortKey {
        key: "start_timestamp".to_string(),
        asc: 0,
    }]
}

impl Default for FeedRequestConfig {
    fn default() -> Self {
        Self {
            language: default_feed_languages(),
            gameid: default_game_id(),
            offset: 0,
            get_num: default_get_num(),
            ext_info_type_list: default_ext_info_types(),
            secondary_label_id: default_secondary_label(),
            primary_label_id: default_primary_label(),
            sort_by_list: default_sort_by(),
            use_default_language: false,
        }
    }
}

/// Upstream feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Feed endpoint (receives a JSON POST).
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// Request payload.
    #[serde(default)]
    pub request: FeedRequestConfig,
    /// Value of the `x-areaid` header.
    #[serde(default = "default_area_id")]
    pub area_id: String,
    /// Value of the `x-language` header.
    #[serde(default = "default_header_language")]
    pub header_language: String,
    /// Value of the `x-source` header.
    #[serde(default = "default_source")]
    pub source: String,
    /// User agent sent with every feed request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum response size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: u64,
}

fn default_feed_url() -> String {
    "https://sg-community.playerinfinite.com/api/gpts.information_feeds_svr.InformationFeedsSvr/GetContentByLabel".to_string()
}

fn default_area_id() -> String {
    "global".to_string()
}

fn default_header_language() -> String {
    "en".to_string()
}

fn default_source() -> String {
    "pc_web".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_response_bytes() -> u64 {
    5 * 1024 * 1024 // 5MB
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            request: FeedRequestConfig::default(),
            area_id: default_area_id(),
            header_language: default_header_language(),
            source: default_source(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

/// Translation provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    /// Provider endpoint.
    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,
    /// Source language code (`auto` lets the provider detect it).
    #[serde(default = "default_source_language")]
    pub source_language: String,
    /// Target language code; one per deployment.
    #[serde(default = "default_target_language")]
    pub target_language: String,
    /// Upper bound for a single translation call in seconds.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
    /// Maximum number of items translated at the same time.
    #[serde(default = "default_max_concurrent_items")]
    pub max_concurrent_items: usize,
}

fn default_translate_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_language() -> String {
    "tr".to_string()
}

fn default_call_timeout() -> u64 {
    15
}

fn default_max_concurrent_items() -> usize {
    8
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translate_endpoint(),
            source_language: default_source_language(),
            target_language: default_target_language(),
            call_timeout_secs: default_call_timeout(),
            max_concurrent_items: default_max_concurrent_items(),
        }
    }
}

/// Result cache and write-through store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// How long an aggregated result is served without re-fetching.
    #[serde(default = "default_cache_duration")]
    pub duration_secs: u64,
    /// Key used by the external store.
    #[serde(default = "default_store_key")]
    pub store_key: String,
    /// Redis URL for the write-through store (disabled when unset).
    #[serde(default)]
    pub redis_url: Option<String>,
}

fn default_cache_duration() -> u64 {
    crate::news::DEFAULT_CACHE_DURATION_SECS
}

fn default_store_key() -> String {
    "news".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_cache_duration(),
            store_key: default_store_key(),
            redis_url: None,
        }
    }
}

/// Refresh trigger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Shared bearer secret. Empty means every trigger is rejected.
    #[serde(default)]
    pub secret: String,
    /// Accepted refresh triggers per minute.
    #[serde(default = "default_refresh_rate_limit")]
    pub rate_limit_per_minute: u32,
    /// Background refresh interval in seconds (0 = disabled).
    #[serde(default)]
    pub interval_secs: u64,
}

fn default_refresh_rate_limit() -> u32 {
    6
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            rate_limit_per_minute: default_refresh_rate_limit(),
            interval_secs: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file (empty = console only).
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/newsbridge.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream feed configuration.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Translation configuration.
    #[serde(default)]
    pub translation: TranslationConfig,
    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Refresh trigger configuration.
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(NewsError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| NewsError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `NEWSBRIDGE_REFRESH_SECRET`: refresh bearer secret (`CRON_SECRET` is
    ///   accepted when it is unset)
    /// - `NEWSBRIDGE_REDIS_URL`: enables the Redis write-through store
    /// - `NEWSBRIDGE_TARGET_LANGUAGE`: target language code
    pub fn apply_env_overrides(&mut self) {
        let secret = non_empty_env("NEWSBRIDGE_REFRESH_SECRET")
            .or_else(|| non_empty_env("CRON_SECRET"));
        if let Some(secret) = secret {
            self.refresh.secret = secret;
        }
        if let Some(url) = non_empty_env("NEWSBRIDGE_REDIS_URL") {
            self.cache.redis_url = Some(url);
        }
        if let Some(lang) = non_empty_env("NEWSBRIDGE_TARGET_LANGUAGE") {
            self.translation.target_language = lang;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.cache.duration_secs == 0 {
            return Err(NewsError::Validation(
                "cache.duration_secs must be greater than zero".to_string(),
            ));
        }
        if self.translation.max_concurrent_items == 0 {
            return Err(NewsError::Validation(
                "translation.max_concurrent_items must be greater than zero".to_string(),
            ));
        }
        if self.translation.call_timeout_secs == 0 {
            return Err(NewsError::Validation(
                "translation.call_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.translation.target_language.trim().is_empty() {
            return Err(NewsError::Validation(
                "translation.target_language is not set".to_string(),
            ));
        }
        validate_http_url("feed.url", &self.feed.url)?;
        validate_http_url("translation.endpoint", &self.translation.endpoint)?;
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| NewsError::Validation(format!("{field} is not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(NewsError::Validation(format!(
            "{field} uses unsupported scheme: {scheme}"
        ))),
    }
}
