//! Lookup failure reasons

use std::fmt::Display;

/// Why a lookup produced no results
///
/// `Aborted` is how a lookup reports that it honoured its abort signal; the
/// handler never surfaces it to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("lookup aborted")]
    Aborted,

    #[error("lookup failed: {0}")]
    Failed(String),
}

impl LookupError {
    pub fn failed(reason: impl Display) -> Self {
        Self::Failed(reason.to_string())
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
