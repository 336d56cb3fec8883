//! News item types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body text used for signing and translation when an item carries neither
/// `content_part` nor `content_desc`.
pub const CONTENT_PLACEHOLDER: &str = "Content unavailable.";

/// Default result cache lifetime in seconds (10 minutes).
pub const DEFAULT_CACHE_DURATION_SECS: u64 = 600;

/// One item as returned by the upstream feed.
///
/// The feed schema is not validated; fields are kept verbatim and only the
/// title and body are read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawNewsItem {
    fields: Map<String, Value>,
}

impl RawNewsItem {
    /// Wrap a JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build an item from a JSON value; anything but an object yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Item title, or an empty string when missing.
    pub fn title(&self) -> &str {
        self.str_field("title").unwrap_or_default()
    }

    /// Body text as supplied by the feed: `content_part`, then `content_desc`.
    /// Empty strings count as missing.
    pub fn raw_body(&self) -> Option<&str> {
        self.str_field("content_part")
            .filter(|s| !s.is_empty())
            .or_else(|| self.str_field("content_desc").filter(|s| !s.is_empty()))
    }

    /// Body text to translate, falling back to [`CONTENT_PLACEHOLDER`].
    pub fn body(&self) -> &str {
        self.raw_body().unwrap_or(CONTENT_PLACEHOLDER)
    }

    /// All feed-provided fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Translated title and body for one piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedPair {
    pub title_tr: String,
    pub content_tr: String,
}

/// A feed item with its translated title and body.
///
/// Serializes as the raw item's fields with `title` replaced and
/// `content_tr` added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslatedNewsItem {
    fields: Map<String, Value>,
}

impl TranslatedNewsItem {
    /// Build from a raw item plus the title and body to expose.
    pub fn new(
        raw: &RawNewsItem,
        title: impl Into<String>,
        content_tr: impl Into<String>,
    ) -> Self {
        let mut fields = raw.fields.clone();
        fields.insert("title".to_string(), Value::String(title.into()));
        fields.insert("content_tr".to_string(), Value::String(content_tr.into()));
        Self { fields }
    }

    /// Build from a raw item and a translated pair.
    pub fn translated(raw: &RawNewsItem, pair: &TranslatedPair) -> Self {
        Self::new(raw, pair.title_tr.clone(), pair.content_tr.clone())
    }

    /// Build the untranslated fallback: the raw title and the raw body text.
    pub fn fallback(raw: &RawNewsItem) -> Self {
        Self::new(raw, raw.title(), raw.raw_body().unwrap_or_default())
    }

    /// Translated title (the source title on fallback).
    pub fn title(&self) -> &str {
        self.fields
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Translated body (the source body on fallback).
    pub fn content_tr(&self) -> &str {
        self.fields
            .get("content_tr")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Look up any other field carried over from the feed.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
