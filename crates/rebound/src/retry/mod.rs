//! Retry loops with power-of-two backoff.
//!
//! Two variants share the same delay growth:
//!
//! - [`Backoff`] - a reusable controller with a delay ceiling, an optional
//!   attempt limit, and an optional wall-clock budget
//! - [`retry()`] - a free function for short, bounded retry counts with no
//!   ceiling and no budget
//!
//! Both take a [`CancellationToken`](tokio_util::sync::CancellationToken).
//! Cancellation ends the sequence with [`Outcome::Cancelled`], never with an
//! error.
//!
//! # Examples
//!
//! ```rust
//! use rebound::{Backoff, BackoffConfig, Outcome};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backoff = Backoff::new(
//!     BackoffConfig::builder()
//!         .max_delay(Duration::from_secs(30))
//!         .max_total_duration(Duration::from_secs(120))
//!         .build(),
//! );
//!
//! let cancel = CancellationToken::new();
//! match backoff.run(&cancel, || true).await? {
//!     Outcome::Succeeded => println!("done"),
//!     Outcome::Cancelled => println!("stopped by caller"),
//! }
//! # Ok(())
//! # }
//! ```

mod controller;
mod delay;
mod stateless;
mod wait;

pub use controller::Backoff;
pub use delay::exponential_delay;
pub use stateless::{retry, retry_async};

/// Non-error end of a retry sequence.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The operation returned `true`.
    Succeeded,
    /// The caller cancelled the sequence before a success.
    Cancelled,
}

impl Outcome {
    /// Whether the operation succeeded.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}
