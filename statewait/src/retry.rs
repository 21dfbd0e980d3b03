//! Bounded retries for transient remote errors.
//!
//! These cover the short-lived conditions around a reconciliation call
//! (throttling, and the propagation lag where a just-created or just-deleted
//! object is not yet visible), as opposed to the long-running status waits
//! handled by [`WaitSpec`](crate::WaitSpec).

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::RemoteError;
use crate::spec::PollInterval;
use thiserror::Error;

const RETRY_INTERVAL: PollInterval = PollInterval::Exponential {
    initial: Duration::from_millis(500),
    max: Duration::from_secs(30),
};

/// Outcome of a retry helper that did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    #[error("operation cancelled")]
    Cancelled,
    /// The budget elapsed while the error remained retryable.
    #[error("retry budget exhausted; last error: {0}")]
    TimedOut(RemoteError),
    /// [`retry_until_not_found`] saw the object survive the whole budget.
    #[error("remote object still exists after {0:?}")]
    StillExists(Duration),
    /// A non-retryable error; surfaced as-is.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Retry `op` with exponential backoff while `retryable` accepts its error,
/// up to `timeout`.
pub async fn retry_when<T, F, Fut, P>(
    timeout: Duration,
    cancel: &CancellationToken,
    mut op: F,
    mut retryable: P,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
    P: FnMut(&RemoteError) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled);
        }

        attempt += 1;
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !retryable(&err) {
            return Err(RetryError::Remote(err));
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(RetryError::TimedOut(err));
        }
        log::debug!("attempt {attempt} failed with transient error, retrying: {err}");
        let pause = RETRY_INTERVAL.delay(attempt).min(deadline - now);
        tokio::select! {
            () = cancel.cancelled() => return Err(RetryError::Cancelled),
            () = sleep(pause) => {}
        }
    }
}

/// Retry `op` while it reports [`RemoteError::NotFound`]. Used after create,
/// where the new object may lag behind the control plane.
pub async fn retry_when_not_found<T, F, Fut>(
    timeout: Duration,
    cancel: &CancellationToken,
    op: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    retry_when(timeout, cancel, op, RemoteError::is_not_found).await
}

/// Retry `op` while it reports [`RemoteError::Retryable`] (throttling,
/// propagation lag surfaced as a service error).
pub async fn retry_when_retryable<T, F, Fut>(
    timeout: Duration,
    cancel: &CancellationToken,
    op: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    retry_when(timeout, cancel, op, RemoteError::is_retryable).await
}

/// Retry `op` until it reports [`RemoteError::NotFound`]. Used after delete,
/// where success means the object has stopped being visible.
pub async fn retry_until_not_found<T, F, Fut>(
    timeout: Duration,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<(), RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled);
        }

        attempt += 1;
        match op().await {
            // Still visible; keep waiting for the delete to propagate.
            Ok(_) => {}
            Err(RemoteError::NotFound) => return Ok(()),
            Err(err) => return Err(RetryError::Remote(err)),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(RetryError::StillExists(timeout));
        }
        let pause = RETRY_INTERVAL.delay(attempt).min(deadline - now);
        tokio::select! {
            () = cancel.cancelled() => return Err(RetryError::Cancelled),
            () = sleep(pause) => {}
        }
    }
}
