#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Cancellable exponential backoff for boolean operations.
//!
//! An operation is any closure returning `bool`: `true` means done, `false`
//! means "failed, try again". This crate calls it immediately and then on a
//! doubling delay until it succeeds, a limit is reached, or the caller
//! cancels.
//!
//! - [`Backoff`] is a reusable controller configured by [`BackoffConfig`]
//! - [`retry()`] is a one-off loop bounded by a retry count
//!
//! Waiting is done on tokio timers, so many sequences can run concurrently on
//! one runtime without blocking each other.
//!
//! # Examples
//!
//! ```rust
//! use rebound::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), BackoffError> {
//! let backoff = Backoff::new(
//!     BackoffConfig::builder()
//!         .max_attempts(3)
//!         .time_unit(Duration::from_millis(100))
//!         .build(),
//! );
//!
//! let cancel = CancellationToken::new();
//! let outcome = backoff.run(&cancel, || true).await?;
//! assert!(outcome.is_success());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod retry;

pub use config::{BackoffConfig, BackoffConfigBuilder};
pub use error::{BackoffError, ConfigError, RetryError};
pub use retry::{Backoff, Outcome, exponential_delay, retry, retry_async};

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use rebound::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::BackoffConfig;
    pub use crate::error::{BackoffError, RetryError};
    pub use crate::retry::{Backoff, Outcome, retry, retry_async};
    pub use tokio_util::sync::CancellationToken;
}
