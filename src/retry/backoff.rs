//! Exponential backoff timeout strategy with a global wall-clock budget.

use crate::error::{Error, Result};
use std::time::{Duration, Instant};

/// Configuration for one retried distributed operation.
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    /// Hard wall-clock budget for the whole operation.
    pub total_timeout: Duration,

    /// Timeout handed out for the first attempt.
    pub initial_timeout: Duration,

    /// Ceiling for per-attempt timeouts.
    pub max_timeout: Duration,

    /// Maximum number of attempts.
    pub retry_limit: u32,

    /// Growth factor between attempts. Must be >= 1.0.
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            total_timeout: Duration::from_secs(60),
            initial_timeout: Duration::from_millis(500),
            max_timeout: Duration::from_secs(10),
            retry_limit: 10,
            multiplier: 2.0,
        }
    }
}

impl BackoffConfig {
    /// Set the total wall-clock budget.
    pub fn with_total_timeout(mut self, total_timeout: Duration) -> Self {
        self.total_timeout = total_timeout;
        self
    }

    /// Set the first-attempt timeout.
    pub fn with_initial_timeout(mut self, initial_timeout: Duration) -> Self {
        self.initial_timeout = initial_timeout;
        self
    }

    /// Set the per-attempt timeout ceiling.
    pub fn with_max_timeout(mut self, max_timeout: Duration) -> Self {
        self.max_timeout = max_timeout;
        self
    }

    /// Set the attempt limit.
    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    /// Set the growth factor.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }
}

/// Grow a timeout by `multiplier`, capped at `max_timeout`.
pub fn next_timeout(timeout: Duration, max_timeout: Duration, multiplier: f64) -> Duration {
    timeout.mul_f64(multiplier).min(max_timeout)
}

/// Worst-case cumulative wait across a full backoff sequence.
///
/// Used to size an enclosing operation's own timeout before starting the
/// retry loop. The accumulated total itself feeds back into the growth step,
/// and accumulation stops once `retry_limit` terms were added or the total
/// reached `max_timeout`.
pub fn total_backoff_timeout(
    initial_timeout: Duration,
    max_timeout: Duration,
    retry_limit: u32,
    multiplier: f64,
) -> Duration {
    let mut total = initial_timeout;

    for _ in 1..retry_limit {
        if total >= max_timeout {
            break;
        }

        total += next_timeout(total, max_timeout, multiplier);
    }

    total
}

/// Paces retries of one distributed operation within a wall-clock budget.
///
/// Per-attempt timeouts start at `initial_timeout` and grow multiplicatively
/// up to `max_timeout`; once a returned value hits the ceiling every later
/// value stays there. The strategy becomes terminal when the wall-clock
/// budget elapses or the attempt limit is hit, after which
/// [`get_and_calculate_next_timeout`](Self::get_and_calculate_next_timeout)
/// fails with [`Error::Timeout`] and never recovers.
///
/// One instance per retried operation; no internal locking or blocking. The
/// caller sleeps between attempts and may poll
/// [`check_timeout`](Self::check_timeout) from an unrelated wait loop.
#[derive(Debug)]
pub struct ExponentialBackoffTimeout {
    /// Immutable parameters of this retry sequence.
    config: BackoffConfig,

    /// When the operation started, for the wall-clock budget check.
    started_at: Instant,

    /// Timeout the next successful request will return.
    current_timeout: Duration,

    /// Attempts handed out so far.
    attempts: u32,
}

impl ExponentialBackoffTimeout {
    /// Create a strategy for a fresh operation; the wall-clock budget starts
    /// counting now.
    ///
    /// # Panics
    ///
    /// Panics if `config.multiplier < 1.0`.
    pub fn new(config: BackoffConfig) -> Self {
        assert!(
            config.multiplier >= 1.0,
            "backoff multiplier must be >= 1.0, got {}",
            config.multiplier
        );

        Self {
            config,
            started_at: Instant::now(),
            current_timeout: config.initial_timeout,
            attempts: 0,
        }
    }

    /// Whether the wall-clock budget has elapsed.
    ///
    /// Pure and idempotent; never fails and never consumes an attempt, so it
    /// is safe to poll from a spin/sleep loop.
    pub fn check_timeout(&self) -> bool {
        self.started_at.elapsed() >= self.config.total_timeout
    }

    /// Remaining wall-clock budget, saturating at zero.
    pub fn remaining(&self) -> Duration {
        self.config.total_timeout.saturating_sub(self.started_at.elapsed())
    }

    /// Timeout the next successful
    /// [`get_and_calculate_next_timeout`](Self::get_and_calculate_next_timeout)
    /// call will return.
    pub fn current_timeout(&self) -> Duration {
        self.current_timeout
    }

    /// Attempts consumed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Hand out the timeout for the next attempt and advance the schedule.
    ///
    /// Fails with [`Error::Timeout`] once the strategy is terminal, by
    /// either the wall-clock budget or the attempt limit.
    pub fn get_and_calculate_next_timeout(&mut self) -> Result<Duration> {
        if self.check_timeout() || self.attempts >= self.config.retry_limit {
            return Err(Error::Timeout);
        }

        let timeout = self.current_timeout;

        self.current_timeout =
            next_timeout(self.current_timeout, self.config.max_timeout, self.config.multiplier);
        self.attempts += 1;

        Ok(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BackoffConfig {
        BackoffConfig {
            total_timeout: Duration::from_millis(5_000),
            initial_timeout: Duration::from_millis(1_000),
            max_timeout: Duration::from_millis(3_000),
            retry_limit: 3,
            multiplier: 2.0,
        }
    }

    #[test]
    fn test_backoff_sequence() {
        let mut backoff = ExponentialBackoffTimeout::new(test_config());

        assert_eq!(backoff.current_timeout(), Duration::from_millis(1_000));

        assert_eq!(
            backoff.get_and_calculate_next_timeout().unwrap(),
            Duration::from_millis(1_000)
        );
        assert_eq!(backoff.current_timeout(), Duration::from_millis(2_000));

        assert_eq!(
            backoff.get_and_calculate_next_timeout().unwrap(),
            Duration::from_millis(2_000)
        );
        assert_eq!(backoff.current_timeout(), Duration::from_millis(3_000));
    }

    #[test]
    fn test_monotonic_and_capped() {
        let config = BackoffConfig {
            total_timeout: Duration::from_secs(3_600),
            initial_timeout: Duration::from_millis(100),
            max_timeout: Duration::from_millis(1_500),
            retry_limit: 20,
            multiplier: 1.7,
        };
        let mut backoff = ExponentialBackoffTimeout::new(config);

        let mut prev = Duration::ZERO;
        let mut capped = false;

        while let Ok(timeout) = backoff.get_and_calculate_next_timeout() {
            assert!(timeout >= prev);
            assert!(timeout <= config.max_timeout);

            // Sticky at the ceiling.
            if capped {
                assert_eq!(timeout, config.max_timeout);
            }
            capped = timeout == config.max_timeout;

            prev = timeout;
        }

        assert!(capped);
        assert_eq!(backoff.attempts(), config.retry_limit);
    }

    #[test]
    fn test_retry_limit_exhaustion() {
        let mut backoff = ExponentialBackoffTimeout::new(test_config());

        for _ in 0..3 {
            backoff.get_and_calculate_next_timeout().unwrap();
        }

        assert!(matches!(
            backoff.get_and_calculate_next_timeout(),
            Err(Error::Timeout)
        ));

        // Terminal state never reverts.
        assert!(matches!(
            backoff.get_and_calculate_next_timeout(),
            Err(Error::Timeout)
        ));
    }

    #[test]
    fn test_wall_clock_exhaustion() {
        let config = test_config().with_total_timeout(Duration::from_millis(20));
        let mut backoff = ExponentialBackoffTimeout::new(config);

        assert!(!backoff.check_timeout() || backoff.remaining() == Duration::ZERO);

        std::thread::sleep(Duration::from_millis(30));

        assert!(backoff.check_timeout());
        assert_eq!(backoff.remaining(), Duration::ZERO);
        assert!(matches!(
            backoff.get_and_calculate_next_timeout(),
            Err(Error::Timeout)
        ));
    }

    #[test]
    fn test_check_timeout_does_not_consume_attempts() {
        let backoff = ExponentialBackoffTimeout::new(test_config());

        for _ in 0..100 {
            assert!(!backoff.check_timeout());
        }

        assert_eq!(backoff.attempts(), 0);
    }

    #[test]
    fn test_total_backoff_timeout_golden_values() {
        assert_eq!(
            total_backoff_timeout(
                Duration::from_millis(1_000),
                Duration::from_millis(5_000),
                3,
                2.0
            ),
            Duration::from_millis(8_000)
        );

        assert_eq!(
            total_backoff_timeout(
                Duration::from_millis(5_000),
                Duration::from_millis(60_000),
                3,
                2.0
            ),
            Duration::from_millis(45_000)
        );
    }

    #[test]
    fn test_total_backoff_timeout_single_attempt() {
        assert_eq!(
            total_backoff_timeout(
                Duration::from_millis(1_000),
                Duration::from_millis(5_000),
                1,
                2.0
            ),
            Duration::from_millis(1_000)
        );
    }

    #[test]
    fn test_next_timeout_caps() {
        assert_eq!(
            next_timeout(Duration::from_millis(3_000), Duration::from_millis(5_000), 2.0),
            Duration::from_millis(5_000)
        );
        assert_eq!(
            next_timeout(Duration::from_millis(1_000), Duration::from_millis(5_000), 2.0),
            Duration::from_millis(2_000)
        );
    }

    #[test]
    #[should_panic(expected = "multiplier must be >= 1.0")]
    fn test_sub_one_multiplier_panics() {
        ExponentialBackoffTimeout::new(test_config().with_multiplier(0.5));
    }
}
