//! Bearer-secret authorization for the refresh trigger.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use sha2::{Digest, Sha256};

use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::{NewsError, Result};

/// The shared refresh secret.
///
/// Only the SHA-256 digest is kept; presented tokens are hashed and the
/// fixed-size digests compared, so the comparison does not depend on where
/// the strings first differ.
#[derive(Clone)]
pub struct RefreshSecret {
    digest: Option<[u8; 32]>,
}

impl RefreshSecret {
    /// An empty secret disables the refresh trigger entirely.
    pub fn new(secret: &str) -> Self {
        let digest = (!secret.is_empty()).then(|| Sha256::digest(secret.as_bytes()).into());
        Self { digest }
    }

    /// Whether a non-empty secret was configured.
    pub fn is_configured(&self) -> bool {
        self.digest.is_some()
    }

    /// Check an `Authorization` header value.
    pub fn verify(&self, authorization: Option<&str>) -> Result<()> {
        let expected = self.digest.ok_or_else(|| {
            NewsError::Authorization("refresh trigger is not configured".to_string())
        })?;

        let token = authorization
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| NewsError::Authorization("missing bearer token".to_string()))?;

        let presented: [u8; 32] = Sha256::digest(token.as_bytes()).into();
        if presented == expected {
            Ok(())
        } else {
            Err(NewsError::Authorization("invalid refresh secret".to_string()))
        }
    }
}

impl std::fmt::Debug for RefreshSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshSecret")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Extractor that only succeeds for requests carrying the refresh secret.
#[derive(Debug, Clone, Copy)]
pub struct RefreshAuth;

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RefreshAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        state.refresh_secret.verify(header).map_err(|e| {
            tracing::debug!("Refresh trigger rejected: {}", e);
            ApiError::from(e)
        })?;

        Ok(RefreshAuth)
    }
}
