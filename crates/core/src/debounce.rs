//! Debounced invocation of a wrapped function
//!
//! A [`Debouncer`] coalesces bursts of calls into as few invocations of the
//! wrapped function as its options allow. Calls never block: they return the
//! result of the most recent invocation, or a fresh result when the call
//! itself invokes (leading edge or `max_wait` ceiling).
//!
//! Timers are tokio tasks spawned on the runtime the debouncer was created
//! on. At most one timer task is alive per debouncer; replacing or cancelling
//! it aborts the old task, and a generation tag makes any late wakeup inert.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{error, trace};

/// Debounce behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceOptions {
    /// Invoke on the leading edge of a burst
    pub immediate: bool,
    /// Force an invocation once this long has passed since the last one,
    /// even if calls never settle
    pub max_wait: Option<Duration>,
    /// Invoke with the latest arguments once calls settle
    pub trailing: bool,
}

impl Default for DebounceOptions {
    fn default() -> Self {
        Self {
            immediate: false,
            max_wait: None,
            trailing: true,
        }
    }
}

type InvokeFn<A, R> = dyn Fn(A) -> R + Send + Sync;

/// The single outstanding timer task
struct Timer {
    handle: JoinHandle<()>,
    generation: u64,
}

/// Per-debouncer invocation record
struct Record<A, R> {
    /// Most recent call to the wrapper
    last_call: Option<Instant>,
    /// Most recent invocation (or leading edge); `None` means never
    last_invoke: Option<Instant>,
    /// Arguments of the latest call not yet handed to the function
    pending: Option<A>,
    timer: Option<Timer>,
    generation: u64,
    last_result: Option<R>,
}

struct Shared<A, R> {
    func: Box<InvokeFn<A, R>>,
    wait: Duration,
    options: DebounceOptions,
    runtime: Handle,
    record: Mutex<Record<A, R>>,
}

/// Handle to a debounced function
///
/// Cloning yields another handle to the same debouncer. Dropping the last
/// handle aborts any scheduled timer without invoking.
pub struct Debouncer<A, R> {
    shared: Arc<Shared<A, R>>,
}

/// Wrap `func` so that calls are debounced by `wait`
///
/// Must be called from within a tokio runtime with the time driver enabled.
pub fn debounce<A, R, F>(func: F, wait: Duration, options: DebounceOptions) -> Result<Debouncer<A, R>>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: Send + 'static,
    R: Clone + Send + 'static,
{
    Debouncer::new(func, wait, options)
}

/// Decide whether a call (or timer expiry) at `now` is allowed to invoke
///
/// A clock reading earlier than the last call is treated as eligible rather
/// than as an error.
fn should_invoke(
    wait: Duration,
    max_wait: Option<Duration>,
    last_call: Option<Instant>,
    last_invoke: Option<Instant>,
    now: Instant,
) -> bool {
    let Some(last_call) = last_call else {
        return true;
    };

    match now.checked_duration_since(last_call) {
        None => return true,
        Some(since_call) if since_call >= wait => return true,
        Some(_) => {}
    }

    match (max_wait, last_invoke) {
        (Some(max_wait), Some(last_invoke)) => now.saturating_duration_since(last_invoke) >= max_wait,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

impl<A, R> Debouncer<A, R>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
{
    /// Create a debouncer; see [`debounce`]
    pub fn new<F>(func: F, wait: Duration, options: DebounceOptions) -> Result<Self>
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        if !options.immediate && !options.trailing && options.max_wait.is_none() {
            return Err(Error::NeverInvokes);
        }
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        Ok(Self {
            shared: Arc::new(Shared {
                func: Box::new(func),
                wait,
                options,
                runtime,
                record: Mutex::new(Record {
                    last_call: None,
                    last_invoke: None,
                    pending: None,
                    timer: None,
                    generation: 0,
                    last_result: None,
                }),
            }),
        })
    }

    /// Call the debounced function
    ///
    /// Returns the fresh result if this call invoked the function, otherwise
    /// the result of the previous invocation (`None` if there was none).
    /// A panic from an invocation made by this call propagates to the caller.
    pub fn call(&self, args: A) -> Option<R> {
        let shared = &self.shared;
        let now = Instant::now();
        let mut rec = shared.record.lock();

        let is_invoking = shared.should_invoke(&rec, now);
        rec.last_call = Some(now);

        let invoke_now = if is_invoking && rec.timer.is_none() {
            trace!(wait = ?shared.wait, "debounce leading edge");
            rec.last_invoke = Some(now);
            Shared::schedule(shared, &mut rec, shared.wait);
            shared.options.immediate
        } else if is_invoking && shared.options.max_wait.is_some() {
            trace!("debounce max wait reached");
            rec.last_invoke = Some(now);
            Shared::schedule(shared, &mut rec, shared.wait);
            true
        } else {
            if rec.timer.is_none() {
                Shared::schedule(shared, &mut rec, shared.wait);
            }
            false
        };

        if invoke_now {
            rec.pending = None;
            drop(rec);
            Some(shared.invoke(args))
        } else {
            rec.pending = Some(args);
            rec.last_result.clone()
        }
    }

    /// Drop the scheduled timer and all pending state without invoking
    ///
    /// The last result is kept. Calling this with nothing pending is a no-op.
    pub fn cancel(&self) {
        let mut rec = self.shared.record.lock();
        if let Some(timer) = rec.timer.take() {
            timer.handle.abort();
        }
        rec.pending = None;
        rec.last_call = None;
        rec.last_invoke = None;
    }

    /// Run the pending trailing invocation now
    ///
    /// Without a scheduled timer this just returns the last result.
    pub fn flush(&self) -> Option<R> {
        let shared = &self.shared;
        let now = Instant::now();
        let mut rec = shared.record.lock();

        let Some(timer) = rec.timer.take() else {
            return rec.last_result.clone();
        };
        timer.handle.abort();

        match shared.trailing_edge(&mut rec, now) {
            Some(args) => {
                drop(rec);
                Some(shared.invoke(args))
            }
            None => rec.last_result.clone(),
        }
    }

    /// Whether a timer is currently scheduled
    pub fn is_pending(&self) -> bool {
        self.shared.record.lock().timer.is_some()
    }

    /// Quiet period the wrapper waits for
    pub fn wait(&self) -> Duration {
        self.shared.wait
    }

    pub fn options(&self) -> DebounceOptions {
        self.shared.options
    }
}

impl<A, R> Shared<A, R>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
{
    fn should_invoke(&self, rec: &Record<A, R>, now: Instant) -> bool {
        should_invoke(self.wait, self.options.max_wait, rec.last_call, rec.last_invoke, now)
    }

    /// Replace the timer with one firing after `delay`
    fn schedule(shared: &Arc<Self>, rec: &mut Record<A, R>, delay: Duration) {
        rec.generation = rec.generation.wrapping_add(1);
        let generation = rec.generation;
        let weak = Arc::downgrade(shared);

        let handle = shared.runtime.spawn(async move {
            time::sleep(delay).await;
            if let Some(shared) = weak.upgrade() {
                Shared::timer_expired(&shared, generation);
            }
        });

        if let Some(old) = rec.timer.replace(Timer { handle, generation }) {
            old.handle.abort();
        }
    }

    fn timer_expired(shared: &Arc<Self>, generation: u64) {
        let now = Instant::now();

        let args = {
            let mut rec = shared.record.lock();
            match rec.timer {
                Some(ref timer) if timer.generation == generation => {}
                _ => return,
            }
            // This task owns the handle; let it detach rather than abort itself
            rec.timer = None;

            if !shared.should_invoke(&rec, now) {
                let since_call = rec
                    .last_call
                    .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
                // Only the quiet period; calls enforce the max_wait ceiling
                let remaining = shared.wait.saturating_sub(since_call);
                trace!(?remaining, "debounce timer rescheduled");
                Shared::schedule(shared, &mut rec, remaining);
                return;
            }

            match shared.trailing_edge(&mut rec, now) {
                Some(args) => args,
                None => return,
            }
        };

        shared.invoke_from_timer(args);
    }

    /// Take the pending arguments for a trailing invocation, if any
    ///
    /// Caller has already cleared the timer.
    fn trailing_edge(&self, rec: &mut Record<A, R>, now: Instant) -> Option<A> {
        let args = rec.pending.take()?;
        if !self.options.trailing {
            trace!("debounce trailing edge suppressed");
            return None;
        }
        trace!("debounce trailing edge");
        rec.last_invoke = Some(now);
        Some(args)
    }

    fn invoke(&self, args: A) -> R {
        let result = (self.func)(args);
        self.record.lock().last_result = Some(result.clone());
        result
    }

    /// Timer-driven invocation: record state is already consistent, so a
    /// panic is logged and re-raised inside the detached timer task only
    fn invoke_from_timer(&self, args: A) {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.func)(args))) {
            Ok(result) => self.record.lock().last_result = Some(result),
            Err(payload) => {
                error!("debounced function panicked during trailing invocation");
                panic::resume_unwind(payload);
            }
        }
    }
}

impl<A, R> Drop for Shared<A, R> {
    fn drop(&mut self) {
        if let Some(timer) = self.record.get_mut().timer.take() {
            timer.handle.abort();
        }
    }
}

impl<A, R> Clone for Debouncer<A, R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A, R> fmt::Debug for Debouncer<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("wait", &self.shared.wait)
            .field("options", &self.shared.options)
            .finish_non_exhaustive()
    }
}
