//! Power-of-two delay growth shared by both retry variants.

use std::time::Duration;

/// Compute `base × 2^attempt × unit`.
///
/// Returns `None` when the result does not fit in a [`Duration`].
///
/// # Examples
///
/// ```rust
/// use rebound::exponential_delay;
/// use std::time::Duration;
///
/// let unit = Duration::from_secs(1);
/// assert_eq!(exponential_delay(1, 0, unit), Some(Duration::from_secs(1)));
/// assert_eq!(exponential_delay(1, 3, unit), Some(Duration::from_secs(8)));
/// assert_eq!(exponential_delay(3, 2, unit), Some(Duration::from_secs(12)));
/// assert_eq!(exponential_delay(1, 200, unit), None);
/// ```
pub fn exponential_delay(base: u32, attempt: u64, unit: Duration) -> Option<Duration> {
    let shift = u32::try_from(attempt).ok()?;
    let factor = 1u64
        .checked_shl(shift)?
        .checked_mul(u64::from(base))?;

    let nanos = unit.as_nanos().checked_mul(u128::from(factor))?;
    let secs = u64::try_from(nanos / 1_000_000_000).ok()?;
    // Remainder is always below one second.
    let subsec = (nanos % 1_000_000_000) as u32;
    Some(Duration::new(secs, subsec))
}

/// Per-sequence delay state.
///
/// Tracks the most recent delay and whether the ceiling has been hit. Once
/// clamped the schedule stops recomputing and keeps returning the ceiling, so
/// the attempt counter can grow without bound.
#[derive(Debug, Clone)]
pub(crate) struct DelaySchedule {
    base: u32,
    unit: Duration,
    ceiling: Option<Duration>,
    maxed: bool,
    current: Duration,
}

impl DelaySchedule {
    /// A schedule clamped at `ceiling`.
    pub(crate) fn capped(base: u32, unit: Duration, ceiling: Duration) -> Self {
        Self {
            base,
            unit,
            ceiling: Some(ceiling),
            maxed: false,
            current: Duration::ZERO,
        }
    }

    /// A schedule with no ceiling. Overflow saturates to [`Duration::MAX`].
    pub(crate) fn uncapped(base: u32, unit: Duration) -> Self {
        Self {
            base,
            unit,
            ceiling: None,
            maxed: false,
            current: Duration::ZERO,
        }
    }

    /// Delay to wait after failed attempt `attempt` (pre-increment value).
    pub(crate) fn next(&mut self, attempt: u64) -> Duration {
        if self.maxed {
            return self.current;
        }

        let computed = exponential_delay(self.base, attempt, self.unit);
        self.current = match (computed, self.ceiling) {
            (Some(d), Some(max)) if d < max => d,
            (_, Some(max)) => {
                self.maxed = true;
                max
            }
            (Some(d), None) => d,
            (None, None) => {
                self.maxed = true;
                Duration::MAX
            }
        };
        self.current
    }

    #[cfg(test)]
    pub(crate) fn is_maxed(&self) -> bool {
        self.maxed
    }
}
