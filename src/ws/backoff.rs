//! Bounded exponential backoff for reconnect attempts.

use std::time::Duration;

use rand::Rng;

use crate::constants::defaults;
use crate::error::{HitbtcError, Result};

/// Reconnect timing and retry budget.
///
/// The delay before attempt `n` (0-based) is
/// `min(initial_delay * factor^n, max_delay)`, with a `jitter` fraction of it
/// randomized. `max_retries` counts retries: with `Some(n)` the client gives
/// up with [`HitbtcError::ConnectionUnavailable`] after `n + 1` consecutive
/// failed attempts, while `None` retries forever.
///
/// A connection that drops before it has been active for `stable_period`
/// counts as a failed attempt, so a server that accepts and then hangs up
/// still exhausts the budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub factor: f64,
    /// Between 0.0 (fixed delays) and 1.0 (fully random in `0..=delay`).
    pub jitter: f64,
    pub max_retries: Option<u32>,
    pub stable_period: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(defaults::RECONNECT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(defaults::RECONNECT_MAX_DELAY_MS),
            factor: defaults::RECONNECT_FACTOR,
            jitter: defaults::RECONNECT_JITTER,
            max_retries: Some(defaults::RECONNECT_MAX_RETRIES),
            stable_period: Duration::from_millis(defaults::RECONNECT_STABLE_PERIOD_MS),
        }
    }
}

impl ReconnectPolicy {
    /// Fixed `delay` between attempts, no jitter.
    pub fn fixed(delay: Duration, max_retries: Option<u32>) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            factor: 1.0,
            jitter: 0.0,
            max_retries,
            stable_period: Duration::from_millis(defaults::RECONNECT_STABLE_PERIOD_MS),
        }
    }

    /// Check that the parameters describe a usable curve.
    pub fn validate(&self) -> Result<()> {
        if self.initial_delay.is_zero() {
            return Err(invalid("initial reconnect delay must be > 0"));
        }
        if self.max_delay < self.initial_delay {
            return Err(invalid("max reconnect delay must be >= initial delay"));
        }
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err(invalid("backoff factor must be >= 1.0"));
        }
        if !self.jitter.is_finite() || !(0.0..=1.0).contains(&self.jitter) {
            return Err(invalid("jitter must be between 0.0 and 1.0"));
        }
        Ok(())
    }

    /// Delay before reconnect attempt `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let initial = self.initial_delay.as_secs_f64();
        let max = self.max_delay.as_secs_f64();
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = (initial * self.factor.powi(exponent)).min(max);

        if self.jitter == 0.0 {
            return Duration::from_secs_f64(base);
        }

        let randomized = rand::rng().random_range(0.0..=base);
        Duration::from_secs_f64(base * (1.0 - self.jitter) + randomized * self.jitter)
    }

    /// Delay before retrying after `failures` consecutive failures.
    ///
    /// The first retry waits `initial_delay`; `0` (a healthy session that
    /// dropped) also does.
    pub fn retry_delay(&self, failures: u32) -> Duration {
        self.delay(failures.saturating_sub(1))
    }

    /// Whether another attempt is allowed after `failures` consecutive failures.
    pub fn allows_retry(&self, failures: u32) -> bool {
        self.max_retries.is_none_or(|max| failures <= max)
    }

    /// Whether a session that stayed active for `uptime` resets the budget.
    pub fn is_stable(&self, uptime: Duration) -> bool {
        uptime >= self.stable_period
    }
}

fn invalid(msg: &str) -> HitbtcError {
    HitbtcError::InvalidArgument(msg.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_and_cap() {
        let policy = ReconnectPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            factor: 2.0,
            jitter: 0.0,
            max_retries: None,
            stable_period: Duration::from_secs(10),
        };
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(800));
        assert_eq!(policy.delay(4), Duration::from_secs(1));
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let policy = ReconnectPolicy {
            jitter: 0.5,
            ..ReconnectPolicy::fixed(Duration::from_millis(400), None)
        };
        for _ in 0..200 {
            let d = policy.delay(0);
            assert!(d >= Duration::from_millis(200) && d <= Duration::from_millis(400), "{d:?}");
        }
    }

    #[test]
    fn retry_budget_is_bounded() {
        let policy = ReconnectPolicy::fixed(Duration::from_millis(10), Some(3));
        assert!(policy.allows_retry(0));
        assert!(policy.allows_retry(3));
        assert!(!policy.allows_retry(4));

        let forever = ReconnectPolicy::fixed(Duration::from_millis(10), None);
        assert!(forever.allows_retry(u32::MAX));
    }

    #[test]
    fn first_retry_waits_initial_delay() {
        let policy = ReconnectPolicy {
            jitter: 0.0,
            ..ReconnectPolicy::default()
        };
        assert_eq!(policy.retry_delay(0), Duration::from_millis(500));
        assert_eq!(policy.retry_delay(1), Duration::from_millis(500));
        assert_eq!(policy.retry_delay(2), Duration::from_secs(1));
        assert_eq!(policy.retry_delay(3), Duration::from_secs(2));
    }

    #[test]
    fn short_sessions_are_not_stable() {
        let policy = ReconnectPolicy::default();
        assert!(!policy.is_stable(Duration::from_millis(50)));
        assert!(!policy.is_stable(Duration::from_millis(9_999)));
        assert!(policy.is_stable(Duration::from_secs(10)));
    }

    #[test]
    fn validate_rejects_bad_curves() {
        assert!(ReconnectPolicy::default().validate().is_ok());
        assert!(ReconnectPolicy::fixed(Duration::ZERO, None).validate().is_err());
        let shrinking = ReconnectPolicy {
            factor: 0.5,
            ..ReconnectPolicy::default()
        };
        assert!(shrinking.validate().is_err());
        let wild = ReconnectPolicy {
            jitter: 1.5,
            ..ReconnectPolicy::default()
        };
        assert!(wild.validate().is_err());
        let inverted = ReconnectPolicy {
            max_delay: Duration::from_millis(1),
            ..ReconnectPolicy::default()
        };
        assert!(inverted.validate().is_err());
    }
}
