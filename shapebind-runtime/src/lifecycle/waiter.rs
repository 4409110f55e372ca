//! Poll loop shared by status and deletion waits.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use super::{Clock, WaitOptions, WaitState};
use crate::errors::{Result, RuntimeError};
use crate::invoker::ErrorClass;

/// What one poll saw.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<T> {
    pub status: Option<String>,
    pub failure_reason: Option<String>,
    pub value: T,
}

/// Terminal condition of a wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitGoal {
    /// Succeed on any of `success`, fail on any of `failure`
    Status {
        success: BTreeSet<String>,
        failure: BTreeSet<String>,
    },
    /// Succeed once the resource is gone or reports `Deleted`
    Deletion,
}

enum Verdict {
    Success,
    Failure,
    Continue,
}

impl WaitGoal {
    pub fn status(success: impl IntoIterator<Item = String>, failure: impl IntoIterator<Item = String>) -> Self {
        Self::Status {
            success: success.into_iter().collect(),
            failure: failure.into_iter().collect(),
        }
    }

    fn judge(&self, status: Option<&str>) -> Verdict {
        let Some(status) = status else {
            return Verdict::Continue;
        };
        match self {
            Self::Status { success, failure } => {
                if success.contains(status) {
                    Verdict::Success
                } else if failure.contains(status) {
                    Verdict::Failure
                } else {
                    Verdict::Continue
                }
            }
            Self::Deletion => {
                let folded = status.replace('_', "").to_ascii_lowercase();
                match folded.as_str() {
                    "deleted" => Verdict::Success,
                    "deletefailed" => Verdict::Failure,
                    _ => Verdict::Continue,
                }
            }
        }
    }
}

/// One wait-for-status or wait-for-delete call.
pub struct WaitSession<'a> {
    resource: String,
    goal: WaitGoal,
    options: &'a WaitOptions,
    clock: &'a dyn Clock,
    state: WaitState,
    polls: u32,
    consecutive_transient: u32,
    last_status: Option<String>,
    elapsed: Duration,
}

impl<'a> WaitSession<'a> {
    /// `resource` labels errors, e.g. "Endpoint my-endpoint".
    pub fn new(resource: impl Into<String>, goal: WaitGoal, options: &'a WaitOptions, clock: &'a dyn Clock) -> Self {
        Self {
            resource: resource.into(),
            goal,
            options,
            clock,
            state: WaitState::Pending,
            polls: 0,
            consecutive_transient: 0,
            last_status: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn state(&self) -> WaitState {
        self.state
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Poll until the goal is reached.
    ///
    /// Returns the last observed value, or `None` when a deletion wait ended
    /// because the resource could no longer be found.
    pub fn run<T, F>(&mut self, mut probe: F) -> Result<Option<T>>
    where
        F: FnMut() -> Result<Observation<T>>,
    {
        let started = self.clock.now();
        self.state = WaitState::Polling;
        log::debug!("Waiting for {} ({:?})", self.resource, self.goal);

        loop {
            self.check_cancelled()?;
            self.polls += 1;

            match probe() {
                Ok(observation) => {
                    self.consecutive_transient = 0;
                    log::trace!(
                        "{} poll {}: status {:?}",
                        self.resource,
                        self.polls,
                        observation.status
                    );
                    match self.goal.judge(observation.status.as_deref()) {
                        Verdict::Success => {
                            self.finish(WaitState::Success, started);
                            return Ok(Some(observation.value));
                        }
                        Verdict::Failure => {
                            self.finish(WaitState::Failure, started);
                            return Err(RuntimeError::WaitFailure {
                                resource: self.resource.clone(),
                                status: observation.status.unwrap_or_default(),
                                reason: observation.failure_reason,
                            });
                        }
                        Verdict::Continue => self.last_status = observation.status,
                    }
                }
                Err(error) => {
                    let class = error
                        .api_code()
                        .map(|code| self.options.classifier.classify_code(code));
                    match class {
                        Some(ErrorClass::NotFound) if self.goal == WaitGoal::Deletion => {
                            log::debug!("{} no longer exists", self.resource);
                            self.finish(WaitState::Success, started);
                            return Ok(None);
                        }
                        Some(ErrorClass::NotFound | ErrorClass::Transient)
                            if self.consecutive_transient < self.options.max_transient_retries =>
                        {
                            self.consecutive_transient += 1;
                            log::warn!(
                                "Transient error while waiting for {} (attempt {}/{}): {}",
                                self.resource,
                                self.consecutive_transient,
                                self.options.max_transient_retries,
                                error
                            );
                        }
                        _ => {
                            self.finish(WaitState::Error, started);
                            return Err(error);
                        }
                    }
                }
            }

            let elapsed = self.clock.now().saturating_duration_since(started);
            self.elapsed = elapsed;
            let mut pause = self.options.poll_interval;
            if let Some(timeout) = self.options.timeout {
                if elapsed >= timeout {
                    self.state = WaitState::Timeout;
                    return Err(RuntimeError::WaitTimeout {
                        resource: self.resource.clone(),
                        status: self.last_status.clone(),
                        elapsed,
                    });
                }
                pause = pause.min(timeout - elapsed);
            }

            self.check_cancelled()?;
            self.clock.sleep(pause);
        }
    }

    fn check_cancelled(&mut self) -> Result<()> {
        if self.options.is_cancelled() {
            self.state = WaitState::Error;
            return Err(RuntimeError::Cancelled {
                resource: self.resource.clone(),
            });
        }
        Ok(())
    }

    fn finish(&mut self, state: WaitState, started: Instant) {
        self.state = state;
        self.elapsed = self.clock.now().saturating_duration_since(started);
        log::debug!(
            "Wait for {} ended in {} after {} polls",
            self.resource,
            state,
            self.polls
        );
    }
}
