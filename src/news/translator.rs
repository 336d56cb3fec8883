//! Translation provider seam.
//!
//! [`Translator`] is the narrow interface the pipeline depends on;
//! [`GoogleTranslator`] talks to the public `translate_a/single` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::TranslationConfig;

/// Longest text accepted in a single call, in characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Errors raised by a single translation call.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The request could not be sent or the response not read.
    #[error("translation request failed: {0}")]
    Request(String),

    /// Non-success status other than 429.
    #[error("translation provider returned HTTP {0}")]
    Status(u16),

    /// The provider answered 429.
    #[error("translation provider rate limited the request")]
    RateLimited,

    /// The response did not contain translated text.
    #[error("malformed translation response: {0}")]
    Malformed(String),

    /// The provider cannot handle this input.
    #[error("unsupported input: {0}")]
    Unsupported(String),

    /// The call did not finish in time.
    #[error("translation timed out after {0:?}")]
    Timeout(Duration),
}

/// Translates one piece of text.
///
/// Every call is independent and issues its own provider request; callers
/// are responsible for caching.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError>;
}

/// Client for Google's `translate_a/single` endpoint (`client=gtx`).
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    source_language: String,
}

impl GoogleTranslator {
    /// Create a translator from configuration.
    pub fn new(config: &TranslationConfig) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.call_timeout_secs))
            .build()
            .map_err(|e| TranslationError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            source_language: config.source_language.clone(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        let chars = text.chars().count();
        if chars > MAX_TEXT_CHARS {
            return Err(TranslationError::Unsupported(format!(
                "text too long: {chars} characters (max {MAX_TEXT_CHARS})"
            )));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_language.as_str()),
                ("tl", target_lang),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
            .send()
            .await
            .map_err(|e| TranslationError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TranslationError::RateLimited);
        }
        if !status.is_success() {
            return Err(TranslationError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TranslationError::Malformed(e.to_string()))?;

        let translated = parse_response(&body)?;
        debug!(chars, target = target_lang, "Translated text");
        Ok(translated)
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The payload looks like `[[["Merhaba ", "Hello ", ...], ["dünya", "world", ...]], null, "en"]`.
fn parse_response(body: &Value) -> Result<String, TranslationError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Malformed("missing sentence list".to_string()))?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(Value::as_str) {
            translated.push_str(part);
        }
    }

    if translated.is_empty() {
        return Err(TranslationError::Malformed(
            "response contained no translated text".to_string(),
        ));
    }
    Ok(translated)
}
