//! Replay a call stream through a throttler

use crate::util::{print_trace, Recorder};
use anyhow::{Context, Result};
use pacer_core::{throttle, ThrottleConfig};
use std::time::Duration;
use tracing::info;

pub async fn run(settings: &ThrottleConfig, every: u64, until: u64, json: bool) -> Result<()> {
    let recorder = Recorder::new();
    let throttled = throttle(recorder.func(), settings.interval(), settings.options())
        .context("Failed to create throttler")?;

    info!(
        interval_ms = settings.interval_ms,
        leading = settings.leading,
        trailing = settings.trailing,
        "replaying call stream"
    );

    let calls = recorder
        .drive(&throttled, Duration::from_millis(every), Duration::from_millis(until))
        .await;

    let label = format!(
        "throttle interval={}ms, a call every {}ms until {}ms",
        settings.interval_ms, every, until
    );
    print_trace(&recorder.finish(label, calls), json)
}
