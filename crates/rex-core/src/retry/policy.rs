use std::time::Duration;

/// Bounded retry parameters with a flat inter-attempt delay.
///
/// `max_retries` counts *additional* attempts after the first, so a
/// persistently failing operation runs `max_retries + 1` times in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay between attempts. Constant across attempts, no backoff.
    pub delay_between: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay_between: Duration::from_secs(5),
        }
    }
}

/// Timeout-escalating retry parameters.
///
/// The timeout of the first attempt is `initial_timeout`; the growth
/// function (doubling unless overridden) is applied before each retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    /// Number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay between attempts. Constant across attempts.
    pub delay_between: Duration,
    /// Timeout handed to the first attempt. Must be non-zero.
    pub initial_timeout: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay_between: Duration::from_secs(5),
            initial_timeout: Duration::from_secs(120),
        }
    }
}
