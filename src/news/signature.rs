//! Content signatures used as translation cache keys.

use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 fingerprint of an item's translatable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentSignature([u8; 32]);

impl ContentSignature {
    /// Compute the signature of a (title, body) pair.
    ///
    /// The title is length-prefixed, so moving text across the title/body
    /// boundary always changes the signature.
    pub fn compute(title: &str, body: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((title.len() as u64).to_le_bytes());
        hasher.update(title.as_bytes());
        hasher.update(body.as_bytes());
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for ContentSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
