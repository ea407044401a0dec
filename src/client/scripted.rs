//! Scripted transport for offline runs
//!
//! Replays a fixed sequence of outcomes, then falls back to an optional
//! responder. Every call is recorded with its query and the (tokio) time it
//! was made, so retry timing can be checked under a paused clock.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::failure::Failure;
use super::transport::{RawResponse, Transport};

type Outcome = Result<RawResponse, Failure>;
type Responder = Box<dyn Fn(&[(String, String)]) -> Outcome + Send + Sync>;

#[derive(Default)]
struct Recorded {
    times: Vec<Instant>,
    queries: Vec<Vec<(String, String)>>,
}

/// Transport that answers from a script instead of the network
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Outcome>>,
    latency: Mutex<VecDeque<Duration>>,
    responder: Option<Responder>,
    recorded: Mutex<Recorded>,
}

impl ScriptedTransport {
    /// Answer with `script` in order
    pub fn new(script: Vec<Outcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    /// Answer every call (after the script runs out) with `responder`
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&[(String, String)]) -> Outcome + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        }
    }

    /// Delay the n-th call by the n-th duration
    pub fn with_latency(self, latency: Vec<Duration>) -> Self {
        *self.latency.lock() = latency.into();
        self
    }

    /// Number of calls made so far
    pub fn calls(&self) -> usize {
        self.recorded.lock().times.len()
    }

    /// When each call was made
    pub fn call_times(&self) -> Vec<Instant> {
        self.recorded.lock().times.clone()
    }

    /// Query pairs of each call
    pub fn queries(&self) -> Vec<Vec<(String, String)>> {
        self.recorded.lock().queries.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, _url: &str, query: &[(String, String)]) -> Outcome {
        {
            let mut recorded = self.recorded.lock();
            recorded.times.push(Instant::now());
            recorded.queries.push(query.to_vec());
        }

        let scripted = self.script.lock().pop_front();
        let outcome = match (scripted, &self.responder) {
            (Some(outcome), _) => outcome,
            (None, Some(responder)) => responder(query),
            (None, None) => Err(Failure::Network("script exhausted".to_string())),
        };

        let delay = self.latency.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        outcome
    }
}
