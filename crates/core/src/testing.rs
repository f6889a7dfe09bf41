//! Shared helpers for timing tests (paused tokio clock)

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Log of invocations as (elapsed ms since creation, args)
pub struct Calls<A> {
    start: Instant,
    log: Arc<Mutex<Vec<(u64, A)>>>,
}

impl<A: Clone + Send + 'static> Calls<A> {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Function that records each invocation and returns the invocation count
    pub fn recorder(&self) -> impl Fn(A) -> usize + Send + Sync + 'static {
        let start = self.start;
        let log = Arc::clone(&self.log);
        move |args| {
            let mut log = log.lock();
            log.push((start.elapsed().as_millis() as u64, args));
            log.len()
        }
    }

    pub fn count(&self) -> usize {
        self.log.lock().len()
    }

    pub fn entries(&self) -> Vec<(u64, A)> {
        self.log.lock().clone()
    }

    pub fn times(&self) -> Vec<u64> {
        self.log.lock().iter().map(|(t, _)| *t).collect()
    }

    pub fn args(&self) -> Vec<A> {
        self.log.lock().iter().map(|(_, a)| a.clone()).collect()
    }
}
