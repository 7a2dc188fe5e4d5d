//! Request throttling port.

use std::time::Duration;

/// Per-client request throttle.
pub trait RateLimiter: Send + Sync {
    /// Record one request from `key` and report whether it may proceed.
    fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;
}

/// Outcome of a throttle check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// How long the client should wait before retrying; zero when allowed.
    pub retry_after: Duration,
}

impl RateLimitResult {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after: Duration::ZERO,
        }
    }

    pub fn denied(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            retry_after,
        }
    }
}

/// Rate limit errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Backend error: {0}")]
    Backend(String),
}
