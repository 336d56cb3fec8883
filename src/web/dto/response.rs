//! Response DTOs for the web API.

use serde::Serialize;

use crate::news::{RefreshOutcome, TranslatedNewsItem};

/// Result of a forced refresh.
///
/// `success` is true only when the pass produced a fresh result. A failed
/// upstream fetch still returns whatever the cache holds in `data`.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<TranslatedNewsItem>>,
}

impl RefreshResponse {
    /// Build the response for a finished pass.
    pub fn from_outcome(outcome: &RefreshOutcome) -> Self {
        let message = match outcome {
            RefreshOutcome::Fresh(snapshot) => {
                format!("Refreshed {} news item(s)", snapshot.items().len())
            }
            RefreshOutcome::Stale(snapshot) => format!(
                "Upstream feed unavailable; serving result fetched at {}",
                snapshot.fetched_at().to_rfc3339()
            ),
            RefreshOutcome::Empty => "Upstream feed unavailable; no news cached yet".to_string(),
        };

        Self {
            success: outcome.is_fresh(),
            message,
            data: outcome.snapshot().map(|s| s.items().to_vec()),
        }
    }
}
