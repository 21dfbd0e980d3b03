//! Wait specifications: what to poll for, how often, and for how long.

use std::fmt;
use std::time::Duration;

use crate::error::SpecError;

/// Floor applied to every poll interval to avoid flooding the remote API.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default overall wait budget when a call site does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Pacing between status polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollInterval {
    /// Sleep the same duration between every poll.
    Fixed(Duration),
    /// Double the sleep after each poll, starting at `initial`, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

impl PollInterval {
    /// Delay before the poll following attempt number `attempt` (1-based).
    /// Always at least [`MIN_POLL_INTERVAL`].
    pub(crate) fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Self::Fixed(interval) => interval.max(MIN_POLL_INTERVAL),
            Self::Exponential { initial, max } => {
                let initial = initial.max(MIN_POLL_INTERVAL);
                let shift = attempt.saturating_sub(1).min(16);
                initial.saturating_mul(1 << shift).min(max.max(initial))
            }
        }
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self::Fixed(DEFAULT_POLL_INTERVAL)
    }
}

/// One wait operation: the statuses that end it and the budget it runs under.
///
/// Constructed per call site through [`WaitSpec::builder`]; construction fails
/// if the target and failure sets overlap. A spec with an empty target set can
/// only end through a failure status, not-found, timeout, or cancellation,
/// which is exactly what a wait-until-deleted call site wants.
#[derive(Debug, Clone)]
pub struct WaitSpec<S> {
    pub(crate) target: Vec<S>,
    pub(crate) failure: Vec<S>,
    pub(crate) timeout: Duration,
    pub(crate) interval: PollInterval,
}

impl<S: PartialEq + fmt::Debug> WaitSpec<S> {
    pub fn builder() -> WaitSpecBuilder<S> {
        WaitSpecBuilder::default()
    }
}

/// Builder for [`WaitSpec`].
#[derive(Debug, Clone)]
pub struct WaitSpecBuilder<S> {
    target: Vec<S>,
    failure: Vec<S>,
    timeout: Duration,
    interval: PollInterval,
}

impl<S> Default for WaitSpecBuilder<S> {
    fn default() -> Self {
        Self {
            target: Vec::new(),
            failure: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            interval: PollInterval::default(),
        }
    }
}

impl<S: PartialEq + fmt::Debug> WaitSpecBuilder<S> {
    /// Add a status that terminates the wait successfully.
    pub fn target(mut self, status: S) -> Self {
        self.target.push(status);
        self
    }

    pub fn targets(mut self, statuses: impl IntoIterator<Item = S>) -> Self {
        self.target.extend(statuses);
        self
    }

    /// Add a status that terminates the wait as a permanent failure.
    pub fn failure(mut self, status: S) -> Self {
        self.failure.push(status);
        self
    }

    pub fn failures(mut self, statuses: impl IntoIterator<Item = S>) -> Self {
        self.failure.extend(statuses);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: PollInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn build(self) -> Result<WaitSpec<S>, SpecError> {
        if self.timeout.is_zero() {
            return Err(SpecError::ZeroTimeout);
        }
        if let Some(status) = self.target.iter().find(|s| self.failure.contains(s)) {
            return Err(SpecError::OverlappingStatuses(format!("{status:?}")));
        }
        Ok(WaitSpec {
            target: self.target,
            failure: self.failure,
            timeout: self.timeout,
            interval: self.interval,
        })
    }
}
