//! Fixed-delay retry policy for the code-exchange path.
//!
//! The vendor's token endpoint occasionally answers with a transient
//! service-unavailable marker in the body; the exchange retries those (and
//! transport-level failures) a bounded number of times with a fixed delay.
//! Every other rejection is terminal on the first attempt.

use std::time::Duration;

use crate::error::ProviderError;

/// Marker string the vendor puts in the response body when the condition is
/// transient and vendor-side.
pub const SERVICE_UNAVAILABLE_MARKER: &str = "temporarily_unavailable";

/// Retry policy for the authorization-code exchange.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
    /// Body substring identifying a transient vendor-side rejection.
    pub unavailable_marker: String,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
            unavailable_marker: SERVICE_UNAVAILABLE_MARKER.to_string(),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries (the simple-variant behavior).
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
            unavailable_marker: SERVICE_UNAVAILABLE_MARKER.to_string(),
        }
    }

    /// Builder: set the total attempt budget.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Builder: set the fixed inter-attempt delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns true if the error is transient under this policy.
    ///
    /// Only transport-level failures and rejections whose body carries the
    /// vendor's service-unavailable marker qualify.
    pub fn is_transient(&self, error: &ProviderError) -> bool {
        match error {
            ProviderError::Transport(_) => true,
            ProviderError::AuthExchange { body, .. } => body.contains(&self.unavailable_marker),
            _ => false,
        }
    }

    /// Returns true if another attempt is allowed after `attempt` (1-indexed)
    /// failed with `error`.
    pub fn should_retry(&self, error: &ProviderError, attempt: u32) -> bool {
        attempt < self.max_attempts && self.is_transient(error)
    }
}
