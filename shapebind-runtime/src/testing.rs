//! Test doubles for the invoker and the clock.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use shapebind_model::WireValue;

use crate::invoker::{ApiError, Invoker};
use crate::lifecycle::Clock;

type Response = Result<WireValue, ApiError>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Invoker that replays scripted responses per operation.
///
/// Responses for an operation are consumed in order; the last one is
/// repeated once the queue is down to it. Every call is recorded.
#[derive(Debug, Default)]
pub struct ScriptedInvoker {
    responses: Mutex<HashMap<String, VecDeque<Response>>>,
    calls: Mutex<Vec<(String, WireValue)>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response, given as JSON.
    #[must_use]
    pub fn respond(self, operation: &str, response: serde_json::Value) -> Self {
        self.push(operation, Ok(WireValue::from(response)));
        self
    }

    /// Queue an error response.
    #[must_use]
    pub fn fail(self, operation: &str, error: ApiError) -> Self {
        self.push(operation, Err(error));
        self
    }

    pub fn push(&self, operation: &str, response: Response) {
        lock(&self.responses)
            .entry(operation.to_string())
            .or_default()
            .push_back(response);
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<(String, WireValue)> {
        lock(&self.calls).clone()
    }

    /// Requests sent to one operation.
    pub fn requests(&self, operation: &str) -> Vec<WireValue> {
        lock(&self.calls)
            .iter()
            .filter(|(name, _)| name == operation)
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        lock(&self.calls).iter().filter(|(name, _)| name == operation).count()
    }
}

impl Invoker for ScriptedInvoker {
    fn invoke(&self, operation: &str, request: &WireValue) -> Result<WireValue, ApiError> {
        lock(&self.calls).push((operation.to_string(), request.clone()));

        let mut responses = lock(&self.responses);
        let Some(queue) = responses.get_mut(operation) else {
            return Err(ApiError::new(
                "NotScripted",
                format!("no response scripted for {}", operation),
            ));
        };
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        next.unwrap_or_else(|| {
            Err(ApiError::new(
                "NotScripted",
                format!("no response scripted for {}", operation),
            ))
        })
    }
}

/// Clock that only moves when slept on or advanced.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<u32>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(0),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *lock(&self.offset) += duration;
    }

    /// Time passed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        *lock(&self.offset)
    }

    pub fn sleeps(&self) -> u32 {
        *lock(&self.sleeps)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *lock(&self.offset)
    }

    fn sleep(&self, duration: Duration) {
        *lock(&self.sleeps) += 1;
        self.advance(duration);
    }
}
