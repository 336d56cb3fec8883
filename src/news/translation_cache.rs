//! Content-addressed memoization of translations.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::news::signature::ContentSignature;
use crate::news::types::TranslatedPair;

/// Translated pairs keyed by content signature.
///
/// Entries live for the whole process and are never evicted; the feed is a
/// small, slowly changing list so memory stays negligible next to the cost
/// of repeated translation calls.
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: RwLock<HashMap<ContentSignature, TranslatedPair>>,
}

impl TranslationCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached pair for a signature.
    pub fn get(&self, signature: &ContentSignature) -> Option<TranslatedPair> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(signature)
            .cloned()
    }

    /// Insert or overwrite the pair for a signature.
    pub fn put(&self, signature: ContentSignature, pair: TranslatedPair) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(signature, pair);
    }

    /// Number of cached signatures.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
