//! Configuration for retrying transactions and observing snapshots.

use std::time::Duration;

/// Default number of transaction attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay step between transaction attempts.
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(500);

/// Configuration for the transaction retry driver.
///
/// Backoff is linear: after the `n`-th failed attempt the driver waits
/// `n × backoff_step` before trying again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay added per failed attempt.
    pub backoff_step: Duration,
    /// Whether to add up to 25% random jitter to each delay.
    pub jitter: bool,
}

impl RetryConfig {
    /// Creates a configuration with the given attempt limit and the default
    /// 500ms backoff step.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_step: DEFAULT_BACKOFF_STEP,
            jitter: false,
        }
    }

    /// Creates a configuration that makes a single attempt.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Sets the maximum number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay step.
    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    /// Enables random jitter on top of the linear delay.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Returns the base delay to wait after `failed_attempts` failures.
    pub fn delay_for_attempt(&self, failed_attempts: u32) -> Duration {
        self.backoff_step.saturating_mul(failed_attempts)
    }

    /// Returns the delay actually slept, with jitter applied if enabled.
    pub(crate) fn sleep_for_attempt(&self, failed_attempts: u32) -> Duration {
        let base = self.delay_for_attempt(failed_attempts);
        if self.jitter && !base.is_zero() {
            let factor: f64 = rand::random::<f64>() * 0.25;
            base + base.mul_f64(factor)
        } else {
            base
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Whether snapshot listeners fire on metadata-only changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataChanges {
    /// Only fire when document data changes.
    #[default]
    Exclude,
    /// Also fire when only snapshot metadata changes.
    Include,
}
