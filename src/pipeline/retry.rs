//! Page-level retry decisions.
//!
//! A transient [`FailureType`] is retried against the same cursor until the
//! attempt budget runs out. The wait between attempts is the same fixed delay
//! the pipeline applies between pages, so a retry never hits the source
//! faster than normal pagination would.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use discovery_core::pipeline::{PageRetryPolicy, RetryDecision};
//! use discovery_core::source::FailureType;
//!
//! let policy = PageRetryPolicy::new(3, Duration::from_millis(500));
//!
//! match policy.should_retry(FailureType::Transient, 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         assert_eq!(delay, Duration::from_millis(500));
//!         assert_eq!(attempt, 2);
//!     }
//!     RetryDecision::DoNotRetry { reason } => panic!("unexpected: {reason}"),
//! }
//! ```

use std::time::Duration;

use tracing::{debug, instrument};

use crate::source::FailureType;

/// Default attempts per page, including the first.
pub const DEFAULT_MAX_PAGE_ATTEMPTS: u32 = 3;

/// Default delay between fetches.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(1000);

/// Decision on whether to fetch a failed page again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Fetch the same cursor again after `delay`.
    Retry {
        /// How long to wait first.
        delay: Duration,
        /// Attempt number of the next fetch (1-indexed, so the first retry is 2).
        attempt: u32,
    },

    /// Give up on this page.
    DoNotRetry {
        /// Human-readable reason.
        reason: String,
    },
}

/// Fixed-delay retry budget for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for PageRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_PAGE_ATTEMPTS,
            delay: DEFAULT_PAGE_DELAY,
        }
    }
}

impl PageRetryPolicy {
    /// Creates a policy. `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Maximum attempts per page, including the first.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay applied before every retry.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Decides whether the page should be fetched again.
    ///
    /// `attempt` is the attempt that just failed (1-indexed).
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        if failure_type == FailureType::Permanent {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "page attempts exhausted");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = self.delay.as_millis(),
            "will retry page"
        );
        RetryDecision::Retry {
            delay: self.delay,
            attempt: attempt + 1,
        }
    }
}
