//! Cooperative cancellation for in-flight lookups

use crate::error::LookupError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Abort flag handed to a lookup
///
/// Clones observe the same flag. Aborting is cooperative: the lookup is
/// expected to notice and fail with [`LookupError::Aborted`], but the handler
/// also discards whatever a lookup returns after its signal fired.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    token: CancellationToken,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.token.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has been aborted
    pub async fn aborted(&self) {
        self.token.cancelled().await
    }

    /// Run `operation` unless the signal fires first
    pub async fn guard<T, F>(&self, operation: F) -> Result<T, LookupError>
    where
        F: Future<Output = Result<T, LookupError>>,
    {
        tokio::select! {
            biased;
            _ = self.aborted() => Err(LookupError::Aborted),
            outcome = operation => outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time;

    #[test]
    fn test_clones_share_state() {
        let signal = AbortSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_aborted());

        signal.abort();
        assert!(clone.is_aborted());

        // Aborting twice is harmless
        clone.abort();
        assert!(signal.is_aborted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_returns_aborted() {
        let signal = AbortSignal::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(10)).await;
            trigger.abort();
        });

        let outcome = signal
            .guard(async {
                time::sleep(Duration::from_secs(5)).await;
                Ok(1)
            })
            .await;
        assert_eq!(outcome, Err(LookupError::Aborted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_wakes_waiters() {
        let signal = AbortSignal::new();
        let waiter = signal.clone();
        let woken = tokio::spawn(async move {
            waiter.aborted().await;
            time::Instant::now()
        });

        time::sleep(Duration::from_millis(30)).await;
        assert!(!woken.is_finished());
        let aborted_at = time::Instant::now();
        signal.abort();

        assert_eq!(woken.await.unwrap(), aborted_at);
        // Already aborted: resolves immediately
        signal.aborted().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_passes_result_through() {
        let signal = AbortSignal::new();
        let outcome = signal.guard(async { Ok::<_, LookupError>("done") }).await;
        assert_eq!(outcome, Ok("done"));
    }
}
