//! Error types for wrapper construction and configuration

use std::path::PathBuf;

/// Errors raised when building a debouncer/throttler or loading config
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Timers are spawned on the ambient tokio runtime
    #[error("debouncer must be created from within a tokio runtime")]
    NoRuntime,

    /// `immediate`, `trailing` and `max_wait` are all off
    #[error("debouncer would never invoke: leading edge, trailing edge and max wait are all disabled")]
    NeverInvokes,

    /// A configuration value is out of range or contradicts another
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),
}

/// Result type for pacer-core operations
pub type Result<T> = std::result::Result<T, Error>;
