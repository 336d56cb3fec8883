//! Rate limiting for the refresh trigger.

use std::num::NonZeroU32;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};

/// Process-wide limiter using Governor.
pub type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Caps how often forced refreshes may run, across all callers.
///
/// Each forced refresh always reaches the upstream feed.
pub struct RefreshRateLimiter {
    limiter: Option<DirectRateLimiter>,
}

impl RefreshRateLimiter {
    /// Allow `requests_per_minute` refreshes; zero disables the limit.
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let limiter = NonZeroU32::new(requests_per_minute)
            .map(|n| RateLimiter::direct(Quota::per_minute(n)));
        Self { limiter }
    }

    /// Consume one unit of quota if available.
    pub fn check(&self) -> bool {
        match &self.limiter {
            Some(limiter) => limiter.check().is_ok(),
            None => true,
        }
    }

    /// Whether a quota is enforced.
    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }
}

impl std::fmt::Debug for RefreshRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshRateLimiter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
