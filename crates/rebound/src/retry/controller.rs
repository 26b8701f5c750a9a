//! Reusable backoff controller with attempt and wall-clock limits.

use super::Outcome;
use super::delay::DelaySchedule;
use super::wait::{Wake, wait};
use crate::config::BackoffConfig;
use crate::error::BackoffError;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Exponential backoff runner for boolean operations.
///
/// The operation is attempted immediately. Each time it returns `false` the
/// controller waits `growth_base × 2^attempt` time units (capped at
/// `max_delay`) and tries again, until the operation succeeds, the
/// cancellation token fires, or a configured limit is reached.
///
/// A controller can run any number of sequences; the attempt counter is reset
/// to 0 whenever a sequence ends. Each sequence counts its own failures, so
/// overlapping runs on a shared controller keep their own delays and limits.
/// [`attempts`](Self::attempts) only reports the most recent failure count
/// published by any of them.
///
/// # Examples
///
/// ```rust
/// use rebound::{Backoff, BackoffConfig, Outcome};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), rebound::BackoffError> {
/// let backoff = Backoff::new(
///     BackoffConfig::builder()
///         .max_attempts(5)
///         .time_unit(Duration::from_millis(100))
///         .build(),
/// );
///
/// let cancel = CancellationToken::new();
/// let mut calls = 0;
/// let outcome = backoff
///     .run(&cancel, || {
///         calls += 1;
///         calls == 3
///     })
///     .await?;
///
/// assert_eq!(outcome, Outcome::Succeeded);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Backoff {
    config: BackoffConfig,
    attempts: AtomicU64,
}

impl Backoff {
    /// Create a controller. Invalid configuration fields are replaced by
    /// their defaults; construction never fails.
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config: config.normalized(),
            attempts: AtomicU64::new(0),
        }
    }

    /// The normalized configuration in use.
    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// Failed attempts published by the most recent failure, 0 when idle.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Reset the published attempt counter.
    ///
    /// A sequence already in progress keeps its own count and limits.
    pub fn reset(&self) {
        self.attempts.store(0, Ordering::SeqCst);
    }

    /// Run `operation` until it returns `true`.
    ///
    /// # Returns
    /// - `Ok(Outcome::Succeeded)`: the operation returned `true`
    /// - `Ok(Outcome::Cancelled)`: `cancel` fired before a success
    /// - `Err(BackoffError::RetryLimitReached)`: `max_attempts` failures
    /// - `Err(BackoffError::RetryTimeoutReached)`: `max_total_duration` elapsed
    ///
    /// The attempt counter is 0 again when this returns.
    pub async fn run<F>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Result<Outcome, BackoffError>
    where
        F: FnMut() -> bool,
    {
        self.run_async(cancel, || std::future::ready(operation())).await
    }

    /// Like [`run`](Self::run), for operations that are themselves async.
    ///
    /// The operation future is always awaited to completion; cancellation is
    /// only observed between attempts and while waiting.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(
            max_attempts = ?self.config.max_attempts,
            max_total_duration = ?self.config.max_total_duration
        )
    )]
    pub async fn run_async<F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Result<Outcome, BackoffError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let _reset = ResetOnDrop(&self.attempts);

        let started = Instant::now();
        let budget = self.config.max_total_duration;
        let deadline = budget.and_then(|budget| started.checked_add(budget));
        let mut schedule = DelaySchedule::capped(
            self.config.growth_base,
            self.config.time_unit,
            self.config.max_delay,
        );
        let mut failed: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                tracing::debug!("backoff cancelled before attempt");
                return Ok(Outcome::Cancelled);
            }

            if operation().await {
                return Ok(Outcome::Succeeded);
            }

            let delay = schedule.next(failed);
            failed += 1;
            self.attempts.store(failed, Ordering::SeqCst);

            if self.config.max_attempts.is_some_and(|max| failed >= max) {
                tracing::warn!(attempts = failed, "max number of backoff retries reached");
                return Err(BackoffError::RetryLimitReached { attempts: failed });
            }

            tracing::debug!("retry {} - waiting {:?}", failed, delay);

            match wait(cancel, delay, deadline).await {
                Wake::Elapsed => {}
                Wake::Cancelled => {
                    tracing::debug!(attempts = failed, "backoff cancelled while waiting");
                    return Ok(Outcome::Cancelled);
                }
                Wake::Deadline => {
                    let elapsed = started.elapsed();
                    tracing::warn!(?elapsed, "backoff timeout reached");
                    return Err(BackoffError::RetryTimeoutReached {
                        budget: budget.unwrap_or_default(),
                        elapsed,
                    });
                }
            }
        }
    }
}

impl From<BackoffConfig> for Backoff {
    fn from(config: BackoffConfig) -> Self {
        Self::new(config)
    }
}

/// Zeroes the attempt counter when a sequence ends, including when the run
/// future is dropped mid-wait.
struct ResetOnDrop<'a>(&'a AtomicU64);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(0, Ordering::SeqCst);
    }
}
