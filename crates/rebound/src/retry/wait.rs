//! Cancellable wait between attempts.

use std::time::Duration;
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;

/// Why a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wake {
    /// The backoff delay elapsed; the next attempt may start.
    Elapsed,
    /// The caller cancelled the sequence.
    Cancelled,
    /// The wall-clock budget ran out.
    Deadline,
}

/// Sleep for `delay`, racing the cancellation token and an optional deadline.
///
/// When several branches are ready on the same poll the order is fixed:
/// cancellation, then deadline, then the delay timer.
pub(crate) async fn wait(
    cancel: &CancellationToken,
    delay: Duration,
    deadline: Option<Instant>,
) -> Wake {
    let deadline_reached = async {
        match deadline {
            Some(at) => sleep_until(at).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Wake::Cancelled,
        _ = deadline_reached => Wake::Deadline,
        _ = sleep(delay) => Wake::Elapsed,
    }
}
