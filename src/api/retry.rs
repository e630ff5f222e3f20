//! Retry policy for model requests.

use crate::error::ApiError;
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub(super) struct RetryPolicy {
    /// Total attempts, including the first request.
    pub(super) max_attempts: u32,
    pub(super) initial_backoff: Duration,
    pub(super) max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Timeouts, connect failures, 429 and 5xx are retried.
    pub(super) fn should_retry(&self, err: &ApiError, attempt: u32) -> bool {
        if attempt.saturating_add(1) >= self.max_attempts {
            return false;
        }
        match err {
            ApiError::Http(inner) => inner.is_timeout() || inner.is_connect(),
            ApiError::Status { code, .. } => *code == 429 || (500..=599).contains(code),
            ApiError::InvalidResponse(_) => false,
        }
    }

    pub(super) fn delay_for(&self, attempt: u32) -> Duration {
        let pow = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(pow)
            .min(self.max_backoff)
    }
}
