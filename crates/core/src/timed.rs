//! Elapsed-time measurement for async operations

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info};

/// Await `operation`, logging how long it took under `name`
///
/// Returns the value together with the elapsed time, or the operation's own
/// error unchanged.
pub async fn timed<T, E, F>(name: &str, operation: F) -> Result<(T, Duration), E>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let start = Instant::now();
    let outcome = operation.await;
    let elapsed = start.elapsed();
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

    match outcome {
        Ok(value) => {
            info!("[timed] {}: {:.2}ms", name, elapsed_ms);
            Ok((value, elapsed))
        }
        Err(e) => {
            error!("[timed] {} failed after {:.2}ms: {}", name, elapsed_ms, e);
            Err(e)
        }
    }
}
