//! Retry policy for unary requests.
//!
//! The service makes no promise about retries, so the default policy makes a
//! single attempt. Opt in with [`RetryConfig::new`] or by raising
//! `max_attempts`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for retrying failed requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds.
    pub initial_delay_ms: u64,
    /// Exponential backoff multiplier.
    pub backoff_multiplier: f64,
    /// Upper bound for a single delay in milliseconds.
    pub max_delay_ms: u64,
    /// Whether to add jitter to retry delays.
    pub jitter: bool,
}

impl RetryConfig {
    /// Creates a policy allowing `max_attempts` attempts with default backoff.
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets the initial delay.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Enables or disables jitter.
    #[must_use]
    pub const fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Returns `true` if another attempt is allowed after `attempt` attempts.
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay to wait after the given (1-based) failed attempt.
    ///
    /// Grows as `initial_delay * multiplier^(attempt - 1)` and never exceeds
    /// `max_delay_ms`. With jitter enabled the delay is drawn uniformly from
    /// `[delay / 2, delay]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let raw = self.initial_delay_ms as f64 * self.backoff_multiplier.max(1.0).powi(exponent);
        let capped = raw.min(self.max_delay_ms as f64).max(0.0) as u64;

        let millis = if self.jitter && capped > 1 {
            let half = capped / 2;
            half + fastrand::u64(0..=capped - half)
        } else {
            capped
        };

        Duration::from_millis(millis)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay_ms: 500,
            backoff_multiplier: 2.0,
            max_delay_ms: 10_000,
            jitter: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_single_attempt() {
        let policy = RetryConfig::default();
        assert_eq!(policy.max_attempts, 1);
        assert!(!policy.should_retry(1));
        assert_eq!(RetryConfig::none(), policy);
    }

    #[test]
    fn test_new_clamps_to_one_attempt() {
        assert_eq!(RetryConfig::new(0).max_attempts, 1);
        let policy = RetryConfig::new(3);
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[test]
    fn test_exponential_backoff_without_jitter() {
        let policy = RetryConfig::new(5).with_jitter(false);
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryConfig::new(50).with_jitter(false);
        assert_eq!(policy.delay_for(40), Duration::from_millis(10_000));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let policy = RetryConfig::new(3);
        for _ in 0..100 {
            let delay = policy.delay_for(2).as_millis();
            assert!((500..=1000).contains(&delay), "delay {delay} out of range");
        }
    }

    #[test]
    fn test_deserialize_partial() {
        let policy: RetryConfig = serde_json::from_str(r#"{"max_attempts":4}"#).unwrap();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.initial_delay_ms, 500);
    }
}
