//! CLI command implementations

pub mod debounce;
pub mod search;
pub mod throttle;
