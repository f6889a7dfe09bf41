//! Throttling: at most one invocation per interval
//!
//! A throttler is a [`Debouncer`] whose `max_wait` equals its wait, so calls
//! under continuous pressure are released once per interval.

use crate::debounce::{DebounceOptions, Debouncer};
use crate::error::Result;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleOptions {
    /// Invoke on the first call of a window
    pub leading: bool,
    /// Invoke with the latest call once the window closes
    pub trailing: bool,
}

impl Default for ThrottleOptions {
    fn default() -> Self {
        Self {
            leading: true,
            trailing: true,
        }
    }
}

/// Wrap `func` so it runs at most once per `interval`
///
/// `trailing: false` suppresses the invocation at the end of a window; the
/// window timer still runs so leading-edge eligibility is unaffected.
pub fn throttle<A, R, F>(func: F, interval: Duration, options: ThrottleOptions) -> Result<Debouncer<A, R>>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: Send + 'static,
    R: Clone + Send + 'static,
{
    let options = DebounceOptions {
        immediate: options.leading,
        max_wait: Some(interval),
        trailing: options.trailing,
    };
    Debouncer::new(func, interval, options)
}
