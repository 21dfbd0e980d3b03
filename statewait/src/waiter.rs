//! The polling loop that drives a [`WaitSpec`] to a terminal condition.

use std::fmt;
use std::future::Future;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::{RemoteError, WaitError};
use crate::spec::WaitSpec;

/// One poll's view of the remote object: the fetched snapshot, its lifecycle
/// status, and any status-supplied failure reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed<T, S> {
    pub snapshot: T,
    pub status: S,
    pub reason: Option<String>,
}

impl<T, S> Observed<T, S> {
    pub fn new(snapshot: T, status: S) -> Self {
        Self {
            snapshot,
            status,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl<S> WaitSpec<S>
where
    S: Clone + PartialEq + fmt::Debug,
{
    /// Poll `fetch` until the object reaches a target status, enters a failure
    /// status, disappears, exceeds the deadline, or `cancel` fires.
    ///
    /// The first fetch happens immediately; a target status on the first poll
    /// returns without sleeping. One final fetch is made once the deadline is
    /// reached, so total wall time is bounded by timeout plus one poll
    /// interval. The fetch function closes over the remote resource handle and
    /// must be free of side effects on the remote object.
    pub async fn wait<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut fetch: F,
    ) -> Result<T, WaitError<S>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Observed<T, S>, RemoteError>>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut attempt: u32 = 0;
        let mut last_status: Option<S> = None;

        loop {
            if cancel.is_cancelled() {
                return Err(WaitError::Cancelled);
            }

            attempt += 1;
            match fetch().await {
                Ok(observed) => {
                    if self.target.contains(&observed.status) {
                        log::debug!(
                            "reached target status {:?} after {attempt} poll(s)",
                            observed.status
                        );
                        return Ok(observed.snapshot);
                    }
                    if self.failure.contains(&observed.status) {
                        return Err(WaitError::TerminalFailure {
                            status: observed.status,
                            reason: observed.reason,
                        });
                    }
                    log::trace!("poll {attempt}: status {:?}, waiting", observed.status);
                    last_status = Some(observed.status);
                }
                Err(RemoteError::NotFound) => return Err(WaitError::NotFound),
                Err(err) => return Err(WaitError::Fetch(err)),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(WaitError::Timeout { last_status });
            }
            let pause = self.interval.delay(attempt).min(deadline - now);
            tokio::select! {
                () = cancel.cancelled() => return Err(WaitError::Cancelled),
                () = sleep(pause) => {}
            }
        }
    }
}
