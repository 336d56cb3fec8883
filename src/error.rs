//! Error types for newsbridge.
//!
//! Component errors (`FeedError`, `TranslationError`, `StoreError`) live next
//! to the component that raises them and are normally recovered where they
//! occur. `NewsError` collects them for bootstrapping code and anything else
//! that needs a single error type.

use thiserror::Error;

use crate::news::{FeedError, StoreError, TranslationError};

/// Common error type for newsbridge.
#[derive(Error, Debug)]
pub enum NewsError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),

    /// Upstream feed error.
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    /// Translation provider error.
    #[error("translation error: {0}")]
    Translation(#[from] TranslationError),

    /// External snapshot store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Refresh trigger without a valid secret.
    #[error("authorization error: {0}")]
    Authorization(String),
}

/// Result type alias for newsbridge operations.
pub type Result<T> = std::result::Result<T, NewsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = NewsError::Config("cache duration must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: cache duration must be positive"
        );
    }

    #[test]
    fn test_authorization_error_display() {
        let err = NewsError::Authorization("missing bearer token".to_string());
        assert_eq!(err.to_string(), "authorization error: missing bearer token");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: NewsError = io_err.into();
        assert!(matches!(err, NewsError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_feed_error_conversion() {
        let err: NewsError = FeedError::Status(502).into();
        assert!(matches!(err, NewsError::Feed(_)));
        assert_eq!(err.to_string(), "feed error: upstream returned HTTP 502");
    }

    #[test]
    fn test_translation_error_conversion() {
        let err: NewsError = TranslationError::RateLimited.into();
        assert!(matches!(err, NewsError::Translation(_)));
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(NewsError::Validation("bad".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
