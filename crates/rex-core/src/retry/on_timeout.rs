//! Timeout-escalating retry: rerun classified timeouts with a growing timeout.

use std::fmt;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use super::policy::TimeoutPolicy;

/// Raised when every attempt of a timeout-retried operation timed out.
///
/// Summarizes the attempt history instead of preserving the per-attempt
/// errors: the operation name, how many attempts ran, and the first and
/// last timeout values used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "'{operation}' timed out after {num_attempts} attempt(s) \
     (initial timeout {initial_timeout:?}, final timeout {final_timeout:?})"
)]
pub struct TimeoutExhausted {
    /// Name of the retried operation, for diagnostics.
    pub operation: String,
    /// Total attempts performed (`max_retries + 1`).
    pub num_attempts: u32,
    /// Timeout of the first attempt.
    pub initial_timeout: Duration,
    /// Timeout of the attempt that just failed. Not the value that would
    /// have been tried next.
    pub final_timeout: Duration,
}

/// Error returned by the timeout-escalating retry loop.
#[derive(Debug)]
pub enum TimeoutRetryError<E> {
    /// The operation failed with a non-timeout error. Never retried,
    /// original error preserved.
    Operation(E),
    /// Every attempt was classified as a timeout.
    Exhausted(TimeoutExhausted),
}

impl<E: fmt::Display> fmt::Display for TimeoutRetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutRetryError::Operation(e) => write!(f, "{}", e),
            TimeoutRetryError::Exhausted(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TimeoutRetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TimeoutRetryError::Operation(e) => Some(e),
            TimeoutRetryError::Exhausted(e) => Some(e),
        }
    }
}

/// Runs `op` with an escalating timeout until it succeeds, doubling the
/// timeout before each retry.
///
/// See [`retry_on_timeout_with`] for the growth-function form.
pub fn retry_on_timeout<T, E, F, C>(
    policy: &TimeoutPolicy,
    operation: &str,
    op: F,
    is_timeout: C,
) -> Result<T, TimeoutRetryError<E>>
where
    F: FnMut(Duration) -> Result<T, E>,
    C: FnMut(&E) -> bool,
{
    retry_on_timeout_with(policy, operation, op, is_timeout, |t| t.saturating_mul(2))
}

/// Runs `op(timeout)` until it succeeds or the policy's attempts are
/// exhausted.
///
/// Errors the `is_timeout` classifier rejects propagate immediately as
/// [`TimeoutRetryError::Operation`], unretried. On a classified timeout
/// the loop escalates the timeout via `grow`, sleeps the flat delay, and
/// tries again; exhaustion raises [`TimeoutExhausted`] where
/// `final_timeout` is the timeout of the attempt that just failed.
pub fn retry_on_timeout_with<T, E, F, C, G>(
    policy: &TimeoutPolicy,
    operation: &str,
    mut op: F,
    mut is_timeout: C,
    mut grow: G,
) -> Result<T, TimeoutRetryError<E>>
where
    F: FnMut(Duration) -> Result<T, E>,
    C: FnMut(&E) -> bool,
    G: FnMut(Duration) -> Duration,
{
    let mut timeout = policy.initial_timeout;
    let mut retries_left = policy.max_retries;

    loop {
        match op(timeout) {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_timeout(&err) {
                    return Err(TimeoutRetryError::Operation(err));
                }
                if retries_left == 0 {
                    return Err(TimeoutRetryError::Exhausted(TimeoutExhausted {
                        operation: operation.to_string(),
                        num_attempts: policy.max_retries + 1,
                        initial_timeout: policy.initial_timeout,
                        final_timeout: timeout,
                    }));
                }
                retries_left -= 1;
                timeout = grow(timeout);
                tracing::debug!(operation, retries_left, next_timeout = ?timeout, "retrying after timeout");
                thread::sleep(policy.delay_between);
            }
        }
    }
}
