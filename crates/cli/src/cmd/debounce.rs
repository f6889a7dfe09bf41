//! Replay a call stream through a debouncer

use crate::util::{print_trace, Recorder};
use anyhow::{Context, Result};
use pacer_core::{debounce, DebounceConfig};
use std::time::Duration;
use tracing::info;

pub async fn run(settings: &DebounceConfig, every: u64, until: u64, json: bool) -> Result<()> {
    let recorder = Recorder::new();
    let debounced = debounce(recorder.func(), settings.wait(), settings.options())
        .context("Failed to create debouncer")?;

    info!(
        wait_ms = settings.wait_ms,
        max_wait_ms = ?settings.max_wait_ms,
        immediate = settings.immediate,
        trailing = settings.trailing,
        "replaying call stream"
    );

    let calls = recorder
        .drive(&debounced, Duration::from_millis(every), Duration::from_millis(until))
        .await;

    let label = match settings.max_wait_ms {
        Some(max_wait) => format!(
            "debounce wait={}ms max_wait={}ms, a call every {}ms until {}ms",
            settings.wait_ms, max_wait, every, until
        ),
        None => format!(
            "debounce wait={}ms, a call every {}ms until {}ms",
            settings.wait_ms, every, until
        ),
    };
    print_trace(&recorder.finish(label, calls), json)
}
