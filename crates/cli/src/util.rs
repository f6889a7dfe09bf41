//! Shared utilities for CLI commands

use anyhow::Result;
use owo_colors::OwoColorize;
use pacer_core::Debouncer;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};

/// One run of the wrapped function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    /// Offset from the start of the stream
    pub at_ms: u64,
    /// Offset of the call whose arguments were used
    pub call_ms: u64,
}

/// Everything a replay observed
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    pub label: String,
    pub calls: usize,
    pub invocations: Vec<Invocation>,
}

impl Trace {
    /// Largest spacing between consecutive invocations
    pub fn max_gap_ms(&self) -> Option<u64> {
        self.invocations
            .windows(2)
            .map(|pair| pair[1].at_ms - pair[0].at_ms)
            .max()
    }
}

/// Drives a wrapper with a steady call stream and logs when it runs
pub struct Recorder {
    start: Instant,
    log: Arc<Mutex<Vec<Invocation>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The function to wrap; its argument is the offset of the call
    pub fn func(&self) -> impl Fn(u64) + Send + Sync + 'static {
        let start = self.start;
        let log = Arc::clone(&self.log);
        move |call_ms| {
            log.lock().push(Invocation {
                at_ms: millis(start.elapsed()),
                call_ms,
            });
        }
    }

    /// Call `wrapper` every `every` until `until` has passed, then let any
    /// pending timer run out
    pub async fn drive(&self, wrapper: &Debouncer<u64, ()>, every: Duration, until: Duration) -> usize {
        let mut calls = 0;
        loop {
            let offset = self.start.elapsed();
            if offset > until {
                break;
            }
            wrapper.call(millis(offset));
            calls += 1;
            time::sleep(every).await;
        }

        let step = wrapper.wait().max(Duration::from_millis(1));
        while wrapper.is_pending() {
            time::sleep(step).await;
        }
        calls
    }

    pub fn finish(self, label: impl Into<String>, calls: usize) -> Trace {
        let invocations = self.log.lock().clone();
        Trace {
            label: label.into(),
            calls,
            invocations,
        }
    }
}

pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub fn print_trace(trace: &Trace, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(trace)?);
        return Ok(());
    }

    println!("{}", trace.label.bold());
    println!();
    for invocation in &trace.invocations {
        println!(
            "  {} {:>6}ms  {}",
            "●".green(),
            invocation.at_ms,
            format!("(call from {}ms)", invocation.call_ms).dimmed()
        );
    }
    println!();
    println!("  {:<12} {}", "Calls:".dimmed(), trace.calls);
    println!("  {:<12} {}", "Invocations:".dimmed(), trace.invocations.len().to_string().cyan());
    match trace.max_gap_ms() {
        Some(gap) => println!("  {:<12} {}ms", "Max gap:".dimmed(), gap.to_string().yellow()),
        None => println!("  {:<12} {}", "Max gap:".dimmed(), "-".dimmed()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(times: &[u64]) -> Trace {
        Trace {
            label: "test".into(),
            calls: times.len(),
            invocations: times.iter().map(|&t| Invocation { at_ms: t, call_ms: t }).collect(),
        }
    }

    #[test]
    fn test_max_gap() {
        assert_eq!(trace(&[]).max_gap_ms(), None);
        assert_eq!(trace(&[40]).max_gap_ms(), None);
        assert_eq!(trace(&[0, 100, 350, 400]).max_gap_ms(), Some(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_waits_for_trailing_edge() {
        let recorder = Recorder::new();
        let debounced = pacer_core::debounce(recorder.func(), Duration::from_millis(100), Default::default()).unwrap();

        let calls = recorder
            .drive(&debounced, Duration::from_millis(20), Duration::from_millis(200))
            .await;
        let trace = recorder.finish("debounce", calls);

        assert_eq!(trace.calls, 11);
        assert_eq!(
            trace.invocations,
            vec![Invocation {
                at_ms: 300,
                call_ms: 200
            }]
        );
    }
}
