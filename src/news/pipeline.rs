//! Per-item translation with memoization and fallback.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::news::signature::ContentSignature;
use crate::news::translation_cache::TranslationCache;
use crate::news::translator::{TranslationError, Translator};
use crate::news::types::{RawNewsItem, TranslatedNewsItem, TranslatedPair};

/// How an item's translation was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Served from the translation cache.
    Cached,
    /// Translated by the provider and cached.
    Translated,
    /// Translation failed; the item carries its source text.
    Fallback,
}

/// Translates single items, consulting the shared [`TranslationCache`].
///
/// Failures never leave this type: an item whose translation fails is
/// returned untranslated instead.
pub struct ItemTranslationPipeline {
    translator: Arc<dyn Translator>,
    cache: Arc<TranslationCache>,
    target_language: String,
    call_timeout: Duration,
}

impl ItemTranslationPipeline {
    /// Create a pipeline sharing `cache` with other passes.
    pub fn new(
        translator: Arc<dyn Translator>,
        cache: Arc<TranslationCache>,
        target_language: impl Into<String>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            translator,
            cache,
            target_language: target_language.into(),
            call_timeout,
        }
    }

    /// The cache shared by every run of this pipeline.
    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    /// Get the target language code.
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Translate one item.
    pub async fn process(&self, raw: &RawNewsItem) -> (TranslatedNewsItem, ItemOutcome) {
        let title = raw.title();
        let body = raw.body();
        let signature = ContentSignature::compute(title, body);

        if let Some(pair) = self.cache.get(&signature) {
            debug!(%signature, "Translation cache hit");
            return (TranslatedNewsItem::translated(raw, &pair), ItemOutcome::Cached);
        }

        debug!(%signature, "Translation cache miss");
        let translated = tokio::try_join!(self.translate_text(title), self.translate_text(body));

        match translated {
            Ok((title_tr, content_tr)) => {
                let pair = TranslatedPair {
                    title_tr,
                    content_tr,
                };
                let item = TranslatedNewsItem::translated(raw, &pair);
                self.cache.put(signature, pair);
                (item, ItemOutcome::Translated)
            }
            Err(e) => {
                warn!(%signature, title, error = %e, "Translation failed, serving source text");
                (TranslatedNewsItem::fallback(raw), ItemOutcome::Fallback)
            }
        }
    }

    async fn translate_text(&self, text: &str) -> Result<String, TranslationError> {
        tokio::time::timeout(
            self.call_timeout,
            self.translator.translate(text, &self.target_language),
        )
        .await
        .map_err(|_| TranslationError::Timeout(self.call_timeout))?
    }
}
