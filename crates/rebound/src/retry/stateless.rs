//! Single-shot retry without a controller.

use super::Outcome;
use super::delay::DelaySchedule;
use super::wait::{Wake, wait};
use crate::config::DEFAULT_TIME_UNIT;
use crate::error::RetryError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Call `operation`, then keep calling it on an exponential backoff until:
/// - the operation returns `true`
/// - `cancel` fires
/// - `retries` retries have failed
///
/// The first call happens immediately. Retry `n` (0-indexed) waits `2^n`
/// seconds first, with no ceiling, so `retries` should stay small. At most
/// `retries + 1` calls are made.
///
/// # Examples
///
/// ```rust
/// use rebound::{Outcome, retry};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), rebound::RetryError> {
/// let cancel = CancellationToken::new();
/// let outcome = retry(&cancel, || true, 3).await?;
/// assert_eq!(outcome, Outcome::Succeeded);
/// # Ok(())
/// # }
/// ```
pub async fn retry<F>(
    cancel: &CancellationToken,
    mut operation: F,
    retries: u32,
) -> Result<Outcome, RetryError>
where
    F: FnMut() -> bool,
{
    retry_async(cancel, || std::future::ready(operation()), retries).await
}

/// Async counterpart of [`retry`].
pub async fn retry_async<F, Fut>(
    cancel: &CancellationToken,
    mut operation: F,
    retries: u32,
) -> Result<Outcome, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut schedule = DelaySchedule::uncapped(1, DEFAULT_TIME_UNIT);
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        if operation().await {
            return Ok(Outcome::Succeeded);
        }

        if attempt >= retries {
            tracing::warn!(retries, "retry limit reached");
            return Err(RetryError::RetryLimitReached { retries });
        }

        let delay = schedule.next(u64::from(attempt));
        attempt += 1;
        tracing::debug!("retry {}/{} - waiting {:?}", attempt, retries, delay);

        if wait(cancel, delay, None).await == Wake::Cancelled {
            return Ok(Outcome::Cancelled);
        }
    }
}
