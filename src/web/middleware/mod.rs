//! Middleware for the web API.

pub mod auth;
pub mod cors;
pub mod rate_limit;

pub use auth::{RefreshAuth, RefreshSecret};
pub use cors::create_cors_layer;
pub use rate_limit::RefreshRateLimiter;
