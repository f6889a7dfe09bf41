//! Timing-controlled invocation primitives for Pacer
//!
//! This crate provides:
//! - `Debouncer`: leading/trailing edge debounce with a `max_wait` ceiling
//! - `throttle`: at most one invocation per interval, built on the debouncer
//! - Sectioned TOML configuration for both (and for the search handler)
//! - `timed`: elapsed-time logging around async operations

pub mod config;
pub mod debounce;
pub mod error;
pub mod throttle;
pub mod timed;

// Re-exports
pub use config::{DebounceConfig, PacerConfig, SearchConfig, ThrottleConfig};
pub use debounce::{debounce, DebounceOptions, Debouncer};
pub use error::{Error, Result};
pub use throttle::{throttle, ThrottleOptions};
pub use timed::timed;

#[cfg(test)]
mod testing;
