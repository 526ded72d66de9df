//! Retry policies for flaky external operations.
//!
//! This module provides two sequential, blocking retry combinators shared
//! by the rest of the toolkit:
//!
//! - [`retry_on_error`] / [`retry_on_error_with`]: bounded retry with a
//!   flat delay, limited to a caller-designated error category, with a
//!   pluggable exhaustion handler.
//! - [`retry_on_timeout`] / [`retry_on_timeout_with`]: retry of
//!   classifier-recognized timeouts only, escalating the timeout passed
//!   to each successive attempt (doubling by default).
//!
//! The combinators never retry on their own initiative: the executor in
//! [`crate::exec`] performs a single attempt, and wrapping it in a retry
//! loop is the caller's composition choice.

mod on_error;
mod on_timeout;
mod policy;

pub use on_error::{retry_on_error, retry_on_error_with};
pub use on_timeout::{retry_on_timeout, retry_on_timeout_with, TimeoutExhausted, TimeoutRetryError};
pub use policy::{RetryPolicy, TimeoutPolicy};
