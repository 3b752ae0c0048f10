//! Timing configuration shared by the controllers.

use crate::application::debouncer::{BuildError, Debouncer};
use crate::application::reactive::{use_debounce, use_throttle, DebouncedValue, ThrottledCallback};
use crate::application::submit_guard::SubmitGuard;
use crate::application::throttler::Throttler;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default quiet period for [`Debouncer`].
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Default window length for [`Throttler`].
pub const DEFAULT_THROTTLE_LIMIT: Duration = Duration::from_millis(1000);

/// Default cooldown for [`SubmitGuard`].
pub const DEFAULT_SUBMIT_COOLDOWN: Duration = Duration::from_millis(2000);

/// Error returned when timing configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Debounce delay must be greater than zero
    ZeroDebounceDelay,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroDebounceDelay => write!(f, "debounce delay must be greater than 0"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Durations for one group of protected actions, in milliseconds.
///
/// With the `serde` feature the struct can be loaded from any serde format;
/// missing fields fall back to the defaults.
///
/// # Example
/// ```
/// use call_guard::TimingConfig;
/// use std::time::Duration;
///
/// let config = TimingConfig::default().with_submit_cooldown(Duration::from_secs(5));
/// assert_eq!(config.debounce_delay(), Duration::from_millis(300));
/// assert_eq!(config.submit_cooldown(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    /// Debounce quiet period
    pub debounce_ms: u64,
    /// Throttle window length
    pub throttle_ms: u64,
    /// Submission cooldown
    pub cooldown_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: duration_to_ms(DEFAULT_DEBOUNCE_DELAY),
            throttle_ms: duration_to_ms(DEFAULT_THROTTLE_LIMIT),
            cooldown_ms: duration_to_ms(DEFAULT_SUBMIT_COOLDOWN),
        }
    }
}

impl TimingConfig {
    /// Set the debounce quiet period.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_ms = duration_to_ms(delay);
        self
    }

    /// Set the throttle window length.
    pub fn with_throttle_limit(mut self, limit: Duration) -> Self {
        self.throttle_ms = duration_to_ms(limit);
        self
    }

    /// Set the submission cooldown.
    pub fn with_submit_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown_ms = duration_to_ms(cooldown);
        self
    }

    /// Debounce quiet period.
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Throttle window length.
    pub fn throttle_limit(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Submission cooldown.
    pub fn submit_cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Check the configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroDebounceDelay` if the debounce delay is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::ZeroDebounceDelay);
        }
        Ok(())
    }

    /// Build a debouncer using this configuration.
    ///
    /// # Errors
    /// Returns `BuildError::Config` for an invalid configuration and
    /// `BuildError::NoRuntime` outside a tokio runtime.
    pub fn debouncer<A, F>(&self, target: F) -> Result<Debouncer<A>, BuildError>
    where
        A: Send + 'static,
        F: Fn(A) + Send + Sync + 'static,
    {
        self.validate()?;
        Debouncer::builder(target)
            .with_delay(self.debounce_delay())
            .build()
    }

    /// Build a throttler using this configuration.
    pub fn throttler<F>(&self, target: F) -> Throttler<F> {
        Throttler::new(target).with_limit(self.throttle_limit())
    }

    /// Build a submission guard using this configuration.
    pub fn submit_guard<F>(&self, target: F) -> SubmitGuard<F> {
        SubmitGuard::new(target).with_cooldown(self.submit_cooldown())
    }

    /// Build a debounced value trailing its input by the debounce delay.
    ///
    /// `TimingConfig::default().debounced_value(initial)` is the
    /// default-delay form of [`use_debounce`].
    ///
    /// # Errors
    /// Returns `BuildError::Config` for an invalid configuration and
    /// `BuildError::NoRuntime` outside a tokio runtime.
    pub fn debounced_value<T>(&self, initial: T) -> Result<DebouncedValue<T>, BuildError>
    where
        T: Send + Sync + 'static,
    {
        self.validate()?;
        use_debounce(initial, self.debounce_delay())
    }

    /// Build a throttled callback with the throttle limit.
    ///
    /// `TimingConfig::default().throttled_callback(target)` is the
    /// default-limit form of [`use_throttle`].
    pub fn throttled_callback<F>(&self, target: F) -> ThrottledCallback<F> {
        use_throttle(target, self.throttle_limit())
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn duration_to_ms(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}
