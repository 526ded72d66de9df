//! Bounded retry loop: run a closure until success or attempts run out.

use std::thread;

use super::policy::RetryPolicy;

/// Runs `op` until it succeeds or the policy's attempts are exhausted,
/// sleeping the flat delay between attempts.
///
/// Every error is treated as retryable and exhaustion re-raises the last
/// error unchanged. Use [`retry_on_error_with`] to restrict retries to an
/// error category or to recover on exhaustion.
pub fn retry_on_error<T, E, F>(policy: &RetryPolicy, op: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
{
    retry_on_error_with(policy, op, |_| true, Err)
}

/// Full form of the bounded retry loop.
///
/// Only errors accepted by `is_retryable` are retried; anything else
/// propagates immediately on first occurrence. When attempts are
/// exhausted the final error is handed to `on_exhausted`, which may
/// recover with a value or re-raise (possibly a different error of the
/// same type).
///
/// A persistently failing retryable operation is invoked exactly
/// `policy.max_retries + 1` times.
pub fn retry_on_error_with<T, E, F, M, H>(
    policy: &RetryPolicy,
    mut op: F,
    mut is_retryable: M,
    on_exhausted: H,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    M: FnMut(&E) -> bool,
    H: FnOnce(E) -> Result<T, E>,
{
    let mut retries_left = policy.max_retries;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retryable(&err) {
                    return Err(err);
                }
                if retries_left == 0 {
                    return on_exhausted(err);
                }
                retries_left -= 1;
                tracing::debug!(retries_left, "retrying after error");
                thread::sleep(policy.delay_between);
            }
        }
    }
}
