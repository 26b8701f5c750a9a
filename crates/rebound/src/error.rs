//! Error types for backoff sequences.
//!
//! Each retry variant owns its own error type so callers can match on the
//! exact set of failures the operation they called can produce. Cancellation
//! is never an error; it is reported as [`Outcome::Cancelled`](crate::Outcome).

use std::time::Duration;
use thiserror::Error;

/// Failures returned by [`Backoff::run`](crate::Backoff::run).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackoffError {
    /// The configured number of attempts failed without a success.
    #[error("max number of backoff retries reached ({attempts} attempts)")]
    RetryLimitReached {
        /// Number of failed invocations of the operation.
        attempts: u64,
    },

    /// The wall-clock budget for the whole sequence ran out.
    #[error("backoff timeout reached after {elapsed:?} (budget {budget:?})")]
    RetryTimeoutReached {
        /// The configured `max_total_duration`.
        budget: Duration,
        /// Time elapsed since the sequence started.
        elapsed: Duration,
    },
}

impl BackoffError {
    /// Whether this error came from the attempt limit.
    pub fn is_retry_limit(&self) -> bool {
        matches!(self, Self::RetryLimitReached { .. })
    }

    /// Whether this error came from the wall-clock budget.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RetryTimeoutReached { .. })
    }
}

/// Failures returned by the stateless [`retry`](crate::retry()) function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    /// Every retry failed.
    #[error("retry limit reached after {retries} retries")]
    RetryLimitReached {
        /// The retry budget that was exhausted.
        retries: u32,
    },
}

/// Errors raised while loading a [`BackoffConfig`](crate::BackoffConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable was set to something that does not parse.
    #[error("{var} must be a non-negative integer, got: '{value}'")]
    InvalidEnv {
        /// Name of the offending variable.
        var: &'static str,
        /// The raw value found in the environment.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackoffError::RetryLimitReached { attempts: 3 };
        assert_eq!(
            err.to_string(),
            "max number of backoff retries reached (3 attempts)"
        );

        let err = RetryError::RetryLimitReached { retries: 2 };
        assert_eq!(err.to_string(), "retry limit reached after 2 retries");

        let err = ConfigError::InvalidEnv {
            var: "REBOUND_MAX_ATTEMPTS",
            value: "lots".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "REBOUND_MAX_ATTEMPTS must be a non-negative integer, got: 'lots'"
        );
    }

    #[test]
    fn test_error_predicates() {
        let limit = BackoffError::RetryLimitReached { attempts: 1 };
        let timeout = BackoffError::RetryTimeoutReached {
            budget: Duration::from_secs(5),
            elapsed: Duration::from_secs(5),
        };

        assert!(limit.is_retry_limit());
        assert!(!limit.is_timeout());
        assert!(timeout.is_timeout());
        assert!(!timeout.is_retry_limit());
    }
}
