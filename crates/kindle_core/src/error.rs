//! # Core Error Types
//!
//! Errors raised by the slot stores, plus the fatal path used when a store
//! cannot grow.

use std::fmt::Display;

use thiserror::Error;

/// Errors that can occur in core storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The store could not reserve memory for more records.
    #[error("allocation failed: could not grow store to {requested} records")]
    AllocationFailed {
        /// Capacity the store tried to reach.
        requested: usize,
    },

    /// An index past the logical length was used.
    #[error("index {index} out of bounds for store of length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Logical length at the time of the call.
        len: usize,
    },

    /// A removal was requested on an empty store.
    #[error("store is empty")]
    EmptyStore,
}

/// Result type for core storage operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Reports a broken caller contract and terminates.
///
/// Emits the diagnostic through `tracing` and panics. The workspace builds
/// with `panic = "abort"`, so outside of the test harness this ends the
/// process.
///
/// # Panics
///
/// Always.
#[cold]
#[track_caller]
pub fn fatal(err: impl Display) -> ! {
    tracing::error!("fatal: {err}");
    panic!("fatal: {err}");
}
