//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use searchscale_query::{QueryResult, SignalQuery, SignalSource};

/// Replays scripted results, then answers with `fallback` forever.
pub struct ScriptedSource {
    results: Mutex<VecDeque<QueryResult<i64>>>,
    fallback: i64,
    delay: Duration,
    pub calls: AtomicUsize,
    pub last_query: Mutex<Option<SignalQuery>>,
}

impl ScriptedSource {
    pub fn new(results: Vec<QueryResult<i64>>, fallback: i64) -> Self {
        Self {
            results: Mutex::new(results.into()),
            fallback,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn constant(signal: i64) -> Self {
        Self::new(Vec::new(), signal)
    }

    /// Each call sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl SignalSource for ScriptedSource {
    async fn fetch_signal(&self, query: &SignalQuery) -> QueryResult<i64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(self.fallback))
    }
}
