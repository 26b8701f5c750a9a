//! Configuration for the backoff controller

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default growth base (`delay = 1 × 2^attempt` time units).
pub const DEFAULT_GROWTH_BASE: u32 = 1;

/// Default ceiling on a single wait.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Default length of one time unit.
pub const DEFAULT_TIME_UNIT: Duration = Duration::from_secs(1);

/// Configuration for a [`Backoff`](crate::Backoff) controller.
///
/// The delay before retry `n` (0-indexed, counted after the first failure) is
/// `growth_base × 2^n × time_unit`, capped at `max_delay`.
///
/// Invalid values are not rejected; they are replaced by defaults when the
/// controller is built (see [`BackoffConfig::normalized`]).
///
/// # Examples
///
/// ```rust
/// use rebound::BackoffConfig;
/// use std::time::Duration;
///
/// let config = BackoffConfig::builder()
///     .max_delay(Duration::from_secs(30))
///     .max_attempts(5)
///     .max_total_duration(Duration::from_secs(60))
///     .build();
///
/// assert_eq!(config.max_attempts, Some(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Multiplier applied to `2^attempt`. Zero is replaced by 1.
    pub growth_base: u32,

    /// Ceiling on a single wait. Zero is replaced by 10 seconds.
    #[serde(rename = "max_delay_ms", with = "duration_ms")]
    pub max_delay: Duration,

    /// Upper bound on failed attempts. `None` or zero means unlimited.
    pub max_attempts: Option<u64>,

    /// Wall-clock budget for the whole sequence. `None` or zero means unlimited.
    #[serde(rename = "max_total_duration_ms", with = "option_duration_ms")]
    pub max_total_duration: Option<Duration>,

    /// Length of one time unit. Zero is replaced by 1 second.
    #[serde(rename = "time_unit_ms", with = "duration_ms")]
    pub time_unit: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            growth_base: DEFAULT_GROWTH_BASE,
            max_delay: DEFAULT_MAX_DELAY,
            max_attempts: None,
            max_total_duration: None,
            time_unit: DEFAULT_TIME_UNIT,
        }
    }
}

impl BackoffConfig {
    /// Create a new builder for configuring a backoff.
    pub fn builder() -> BackoffConfigBuilder {
        BackoffConfigBuilder::default()
    }

    /// Replace invalid or zero fields with their defaults.
    ///
    /// Zero-valued limits are turned into `None` so that "unlimited" has a
    /// single representation.
    pub fn normalized(mut self) -> Self {
        if self.growth_base == 0 {
            tracing::debug!("defaulting growth base to {}", DEFAULT_GROWTH_BASE);
            self.growth_base = DEFAULT_GROWTH_BASE;
        }

        if self.max_delay.is_zero() {
            tracing::debug!("defaulting max delay to {:?}", DEFAULT_MAX_DELAY);
            self.max_delay = DEFAULT_MAX_DELAY;
        }

        if self.time_unit.is_zero() {
            tracing::debug!("defaulting time unit to {:?}", DEFAULT_TIME_UNIT);
            self.time_unit = DEFAULT_TIME_UNIT;
        }

        if self.max_attempts == Some(0) {
            self.max_attempts = None;
        }

        if self.max_total_duration.is_some_and(|d| d.is_zero()) {
            self.max_total_duration = None;
        }

        self
    }

    /// Load configuration from environment variables.
    ///
    /// This will look for:
    /// - `REBOUND_GROWTH_BASE` for the growth base
    /// - `REBOUND_MAX_DELAY_MS` for the single-wait ceiling in milliseconds
    /// - `REBOUND_MAX_ATTEMPTS` for the attempt limit
    /// - `REBOUND_MAX_TOTAL_DURATION_MS` for the wall-clock budget in milliseconds
    /// - `REBOUND_TIME_UNIT_MS` for the time unit in milliseconds
    ///
    /// Unset variables keep their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`](crate::ConfigError::InvalidEnv) if a
    /// variable is set but is not valid Unicode or does not parse as a
    /// non-negative integer.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self, crate::error::ConfigError> {
        let mut config = Self::default();

        if let Some(base) = read_env::<u32>("REBOUND_GROWTH_BASE")? {
            config.growth_base = base;
        }

        if let Some(ms) = read_env::<u64>("REBOUND_MAX_DELAY_MS")? {
            config.max_delay = Duration::from_millis(ms);
        }

        if let Some(attempts) = read_env::<u64>("REBOUND_MAX_ATTEMPTS")? {
            config.max_attempts = Some(attempts);
        }

        if let Some(ms) = read_env::<u64>("REBOUND_MAX_TOTAL_DURATION_MS")? {
            config.max_total_duration = Some(Duration::from_millis(ms));
        }

        if let Some(ms) = read_env::<u64>("REBOUND_TIME_UNIT_MS")? {
            config.time_unit = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

#[cfg(feature = "env")]
fn read_env<T: std::str::FromStr>(
    var: &'static str,
) -> Result<Option<T>, crate::error::ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| crate::error::ConfigError::InvalidEnv { var, value }),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(raw)) => Err(crate::error::ConfigError::InvalidEnv {
            var,
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}

/// Builder for [`BackoffConfig`].
///
/// Unset fields fall back to the [`Default`] values.
#[derive(Debug, Default)]
pub struct BackoffConfigBuilder {
    growth_base: Option<u32>,
    max_delay: Option<Duration>,
    max_attempts: Option<u64>,
    max_total_duration: Option<Duration>,
    time_unit: Option<Duration>,
}

impl BackoffConfigBuilder {
    /// Set the growth base.
    ///
    /// Default: 1
    pub fn growth_base(mut self, base: u32) -> Self {
        self.growth_base = Some(base);
        self
    }

    /// Set the ceiling on a single wait.
    ///
    /// Default: 10s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Set the maximum number of failed attempts.
    ///
    /// Default: unlimited
    pub fn max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set the wall-clock budget for a whole sequence.
    ///
    /// Default: unlimited
    pub fn max_total_duration(mut self, budget: Duration) -> Self {
        self.max_total_duration = Some(budget);
        self
    }

    /// Set the length of one time unit.
    ///
    /// Default: 1s
    pub fn time_unit(mut self, unit: Duration) -> Self {
        self.time_unit = Some(unit);
        self
    }

    /// Build the `BackoffConfig`.
    pub fn build(self) -> BackoffConfig {
        let defaults = BackoffConfig::default();
        BackoffConfig {
            growth_base: self.growth_base.unwrap_or(defaults.growth_base),
            max_delay: self.max_delay.unwrap_or(defaults.max_delay),
            max_attempts: self.max_attempts,
            max_total_duration: self.max_total_duration,
            time_unit: self.time_unit.unwrap_or(defaults.time_unit),
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod option_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|ms| ms.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = BackoffConfig::default();

        assert_eq!(config.growth_base, 1);
        assert_eq!(config.max_delay, Duration::from_secs(10));
        assert_eq!(config.max_attempts, None);
        assert_eq!(config.max_total_duration, None);
        assert_eq!(config.time_unit, Duration::from_secs(1));
    }

    #[test]
    fn test_normalize_replaces_invalid_fields() {
        let config = BackoffConfig {
            growth_base: 0,
            max_delay: Duration::ZERO,
            max_attempts: Some(0),
            max_total_duration: Some(Duration::ZERO),
            time_unit: Duration::ZERO,
        }
        .normalized();

        assert_eq!(config, BackoffConfig::default());
    }

    #[test]
    fn test_normalize_keeps_valid_fields() {
        let config = BackoffConfig {
            growth_base: 3,
            max_delay: Duration::from_secs(30),
            max_attempts: Some(7),
            max_total_duration: Some(Duration::from_secs(90)),
            time_unit: Duration::from_millis(100),
        };

        assert_eq!(config.clone().normalized(), config);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = BackoffConfig::builder()
            .growth_base(2)
            .max_delay(Duration::from_secs(30))
            .max_attempts(5)
            .max_total_duration(Duration::from_secs(60))
            .time_unit(Duration::from_millis(10))
            .build();

        assert_eq!(config.growth_base, 2);
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert_eq!(config.max_attempts, Some(5));
        assert_eq!(config.max_total_duration, Some(Duration::from_secs(60)));
        assert_eq!(config.time_unit, Duration::from_millis(10));
    }

    #[test]
    fn test_builder_defaults() {
        assert_eq!(BackoffConfig::builder().build(), BackoffConfig::default());
    }

    #[test]
    fn test_deserialize_toml() {
        let config: BackoffConfig = toml::from_str(
            r#"
            growth_base = 2
            max_delay_ms = 5000
            max_attempts = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.growth_base, 2);
        assert_eq!(config.max_delay, Duration::from_secs(5));
        assert_eq!(config.max_attempts, Some(4));
        assert_eq!(config.max_total_duration, None);
        assert_eq!(config.time_unit, DEFAULT_TIME_UNIT);
    }

    #[test]
    fn test_json_shape() {
        let config = BackoffConfig::builder()
            .max_total_duration(Duration::from_millis(1500))
            .build();

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["max_delay_ms"], 10_000);
        assert_eq!(value["max_total_duration_ms"], 1500);
        assert_eq!(value["time_unit_ms"], 1000);
        assert!(value["max_attempts"].is_null());

        let back: BackoffConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("REBOUND_GROWTH_BASE", Some("2")),
                ("REBOUND_MAX_DELAY_MS", Some("2500")),
                ("REBOUND_MAX_ATTEMPTS", Some("6")),
                ("REBOUND_MAX_TOTAL_DURATION_MS", Some("60000")),
                ("REBOUND_TIME_UNIT_MS", None),
            ],
            || {
                let config = BackoffConfig::from_env().unwrap();
                assert_eq!(config.growth_base, 2);
                assert_eq!(config.max_delay, Duration::from_millis(2500));
                assert_eq!(config.max_attempts, Some(6));
                assert_eq!(config.max_total_duration, Some(Duration::from_secs(60)));
                assert_eq!(config.time_unit, DEFAULT_TIME_UNIT);
            },
        );
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_from_env_invalid_value() {
        temp_env::with_var("REBOUND_MAX_ATTEMPTS", Some("many"), || {
            let err = BackoffConfig::from_env().unwrap_err();
            assert_eq!(
                err,
                crate::error::ConfigError::InvalidEnv {
                    var: "REBOUND_MAX_ATTEMPTS",
                    value: "many".to_string(),
                }
            );
        });
    }

    #[cfg(all(feature = "env", unix))]
    #[test]
    fn test_from_env_non_unicode_value() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"1\xff0");
        temp_env::with_var("REBOUND_MAX_DELAY_MS", Some(raw), || {
            let err = BackoffConfig::from_env().unwrap_err();
            assert_eq!(
                err,
                crate::error::ConfigError::InvalidEnv {
                    var: "REBOUND_MAX_DELAY_MS",
                    value: "1\u{FFFD}0".to_string(),
                }
            );
        });
    }
}
