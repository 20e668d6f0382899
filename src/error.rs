//! Error type shared by every container in the crate.
//!
//! Containers never log or retry a failure: each checked accessor (`at`, `front`,
//! `pop_back`, `top`, ...) hands a [`CollectionError`] straight back to the caller.
//! The `Option`-returning accessors (`get`, `pop`, `peek`) remain available for code
//! that prefers to branch on absence.

use thiserror::Error;

/// Failure kinds signalled by checked container operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionError {
    /// An index or position argument lies outside the valid bounds.
    #[error("index {index} out of range for length {len}")]
    OutOfRange {
        /// The rejected index
        index: usize,
        /// The container length at the time of the call
        len: usize,
    },

    /// The operation needs at least one element.
    #[error("operation requires a non-empty container")]
    Empty,

    /// A keyed lookup (or a handle lookup) matched nothing.
    #[error("key not found")]
    NotFound,

    /// A structural precondition was violated, e.g. inserting past the end.
    #[error("invalid position {index} for container of length {len}")]
    InvalidArgument {
        /// The rejected position
        index: usize,
        /// The container length at the time of the call
        len: usize,
    },
}

impl CollectionError {
    /// Create an out of range error
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(index: usize, len: usize) -> Self {
        Self::InvalidArgument { index, len }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, CollectionError>;
