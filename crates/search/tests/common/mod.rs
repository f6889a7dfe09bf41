//! Common utilities for search integration tests

#![allow(dead_code)]

use pacer_search::{lookup_fn, AbortSignal, Lookup, LookupError, SearchOptions, SearchOutcome};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Fake search backend that records every query it receives
#[derive(Clone)]
pub struct Backend {
    calls: Arc<Mutex<Vec<String>>>,
    latency: Duration,
    results_per_query: usize,
    honor_abort: bool,
}

impl Backend {
    pub fn new(latency: Duration) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            latency,
            results_per_query: 2,
            honor_abort: true,
        }
    }

    pub fn with_results(mut self, count: usize) -> Self {
        self.results_per_query = count;
        self
    }

    /// Keep running (and return `Ok`) after the abort signal fires
    pub fn ignoring_abort(mut self) -> Self {
        self.honor_abort = false;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Lookup over this backend; the query "fail" produces an error
    pub fn lookup(&self) -> impl Lookup<Item = String> {
        let backend = self.clone();
        lookup_fn(move |query: String, signal: AbortSignal| {
            let backend = backend.clone();
            async move {
                backend.calls.lock().push(query.clone());
                let work = async {
                    time::sleep(backend.latency).await;
                    if query == "fail" {
                        return Err(LookupError::failed("backend down"));
                    }
                    Ok((1..=backend.results_per_query)
                        .map(|n| format!("{query}-{n}"))
                        .collect::<Vec<String>>())
                };
                if backend.honor_abort {
                    signal.guard(work).await
                } else {
                    work.await
                }
            }
        })
    }
}

/// Collects outcomes delivered to search callbacks
#[derive(Clone, Default)]
pub struct Outcomes {
    log: Arc<Mutex<Vec<SearchOutcome<String>>>>,
}

impl Outcomes {
    pub fn sink(&self) -> impl FnOnce(SearchOutcome<String>) + Send + 'static {
        let log = Arc::clone(&self.log);
        move |outcome| log.lock().push(outcome)
    }

    pub fn all(&self) -> Vec<SearchOutcome<String>> {
        self.log.lock().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.log.lock().iter().map(|o| o.query.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }
}

pub fn options() -> SearchOptions {
    SearchOptions {
        debounce: ms(300),
        min_length: 2,
        max_length: 100,
        cache: true,
        cache_size: 50,
    }
}
