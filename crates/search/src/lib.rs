//! Deduplicated, cached, cancellable search for Pacer
//!
//! This crate provides:
//! - `SearchHandler`: debounced lookups with a FIFO result cache and
//!   supersession of in-flight requests for the same query
//! - `AbortSignal` / `Lookup`: the cooperative-cancellation contract a
//!   lookup implementation works against
//! - `FifoCache`: insertion-ordered bounded cache
//! - `SearchSession`: search-box model that hides stale outcomes and tracks
//!   the selected result

pub mod cache;
pub mod error;
pub mod handler;
pub mod lookup;
pub mod session;
pub mod signal;

// Re-exports
pub use cache::FifoCache;
pub use error::LookupError;
pub use handler::{SearchHandler, SearchOptions, SearchOutcome};
pub use lookup::{lookup_fn, FnLookup, Lookup};
pub use session::{SearchSession, SessionView};
pub use signal::AbortSignal;

/// Result type for search construction
pub type Result<T> = pacer_core::Result<T>;
