//! Middleware, extractors and the HTTP error type.

pub mod auth;
pub mod error;
pub mod rate_limit;
