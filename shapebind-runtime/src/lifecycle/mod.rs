//! Waiting for resources to reach a lifecycle status, and paginated listing.
//!
//! Waits are synchronous: a [`WaitSession`] polls through a caller-supplied
//! probe and suspends the calling thread on a [`Clock`] between polls.
//! Cancellation is cooperative through a [`CancellationToken`], checked before
//! every poll and every sleep.

mod paginator;
mod waiter;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::invoker::ErrorClassifier;

pub use paginator::{Page, Paginator};
pub use waiter::{Observation, WaitGoal, WaitSession};

/// Source of time for waits.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Shared flag that stops waits between polls.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Polling configuration for one wait.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    /// `None` waits until a terminal status
    pub timeout: Option<Duration>,
    /// Consecutive transient errors tolerated before the wait fails
    pub max_transient_retries: u32,
    pub classifier: ErrorClassifier,
    pub cancel: Option<CancellationToken>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            timeout: None,
            max_transient_retries: 3,
            classifier: ErrorClassifier::default(),
            cancel: None,
        }
    }
}

impl WaitOptions {
    pub fn new(poll_interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            poll_interval,
            timeout,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn with_max_transient_retries(mut self, retries: u32) -> Self {
        self.max_transient_retries = retries;
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

/// Progress of a [`WaitSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Pending,
    Polling,
    Success,
    Failure,
    Timeout,
    Error,
}

impl WaitState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::Polling)
    }
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Polling => "polling",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Timeout => "timeout",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let options = WaitOptions::default().with_cancellation(token.clone());
        assert!(!options.is_cancelled());
        token.cancel();
        assert!(options.is_cancelled());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!WaitState::Pending.is_terminal());
        assert!(!WaitState::Polling.is_terminal());
        assert!(WaitState::Timeout.is_terminal());
        assert_eq!(WaitState::Failure.to_string(), "failure");
    }
}
