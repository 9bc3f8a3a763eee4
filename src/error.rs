//! Error types for the tree's validated entry points.

use alloc::string::String;

/// Convenient `Result` alias for fallible tree operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by the write path and by construction.
///
/// Read paths never fail: an absent key or an unknown comparator yields an
/// empty result instead.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// `try_insert` was called without a key. The tree is left unchanged.
    #[error("cannot insert a value without a key")]
    MissingKey,

    /// The requested branching factor is below the supported minimum.
    #[error("branching factor must be at least {min}, got {given}")]
    InvalidBranchingFactor {
        /// The rejected branching factor.
        given: usize,
        /// The smallest accepted branching factor.
        min: usize,
    },

    /// A comparator string other than `<=`, `==` or `>=`.
    #[error("unknown comparator `{0}`, expected one of `<=`, `==`, `>=`")]
    UnknownComparator(String),
}
