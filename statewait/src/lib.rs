//! Poll-until-terminal-state waiters for eventually-consistent remote APIs.
//!
//! Cloud control planes provision objects asynchronously: a create/update/delete
//! call returns immediately and the object converges to a terminal lifecycle
//! status over the following seconds or minutes. This crate provides the two
//! building blocks a reconciliation layer needs on top of such an API:
//!
//! - [`WaitSpec`]: a declarative description of one wait (target statuses,
//!   failure statuses, poll interval, timeout) driven by [`WaitSpec::wait`]
//!   against a caller-supplied status-fetch function.
//! - The retry helpers ([`retry_when`] and friends): bounded, backoff-paced
//!   retries for transient conditions (throttling, propagation lag) outside
//!   the long-running wait.
//!
//! The waiter itself never mutates remote state and never retries past its
//! deadline; recovery policy (treating not-found as success during delete,
//! re-issuing a request after a timeout) belongs to the call site.

mod error;
mod retry;
mod spec;
mod waiter;

pub use error::{RemoteError, SpecError, WaitError};
pub use retry::{
    retry_until_not_found, retry_when, retry_when_not_found, retry_when_retryable, RetryError,
};
pub use spec::{PollInterval, WaitSpec, WaitSpecBuilder, DEFAULT_TIMEOUT, MIN_POLL_INTERVAL};
pub use waiter::Observed;
