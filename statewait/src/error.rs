//! Error taxonomy shared by the waiter and the retry helpers.

use std::fmt;
use thiserror::Error;

/// Error channel of the remote API client.
///
/// Adapters classify raw SDK errors into these three buckets so the waiter and
/// retry helpers can make policy decisions without knowing the service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote object does not exist at the given handle.
    #[error("remote object not found")]
    NotFound,
    /// Throttling or propagation lag; safe to retry with backoff.
    #[error("retryable remote error: {0}")]
    Retryable(String),
    /// Permanent API failure.
    #[error("remote API error: {0}")]
    Api(String),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }
}

/// Rejected [`WaitSpec`](crate::WaitSpec) configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// A status appears in both the target and the failure set.
    #[error("status {0} is listed as both a target and a failure")]
    OverlappingStatuses(String),
    /// The overall wait timeout is zero.
    #[error("wait timeout must be non-zero")]
    ZeroTimeout,
}

/// Terminal outcome of a wait that did not reach a target status.
///
/// The four non-fetch conditions are deliberately distinct: callers treat
/// `NotFound` as success during delete, surface `TerminalFailure` immediately,
/// and may apply an explicit fallback on `Timeout` that would be wrong for
/// `Cancelled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitError<S> {
    /// The fetch function reported the object missing.
    NotFound,
    /// The object entered a status from the failure set. Never retried.
    TerminalFailure {
        status: S,
        /// Failure reason supplied by the remote object, when available.
        reason: Option<String>,
    },
    /// The deadline elapsed without reaching a target or failure status.
    Timeout { last_status: Option<S> },
    /// The caller's cancellation token fired.
    Cancelled,
    /// The fetch function failed for a reason other than not-found.
    Fetch(RemoteError),
}

impl<S: fmt::Debug> fmt::Display for WaitError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "remote object not found while waiting"),
            Self::TerminalFailure {
                status,
                reason: Some(reason),
            } => write!(f, "reached terminal failure status {status:?}: {reason}"),
            Self::TerminalFailure {
                status,
                reason: None,
            } => write!(f, "reached terminal failure status {status:?}"),
            Self::Timeout {
                last_status: Some(status),
            } => write!(f, "timed out waiting for target status; last status {status:?}"),
            Self::Timeout { last_status: None } => {
                write!(f, "timed out before observing any status")
            }
            Self::Cancelled => write!(f, "wait cancelled"),
            Self::Fetch(err) => write!(f, "fetching status: {err}"),
        }
    }
}

impl<S: fmt::Debug> std::error::Error for WaitError<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            _ => None,
        }
    }
}

impl<S> WaitError<S> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
