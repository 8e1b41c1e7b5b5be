//! Error types for skip map operations.

/// Errors reported by [`SkipMap`](crate::SkipMap) and its range views.
///
/// All errors are raised before any link is rewritten, so a failed mutation
/// leaves the map exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The configured ordering could not compare two keys
    /// (e.g. `NaN` under natural float ordering).
    #[error("keys are not mutually comparable")]
    Uncomparable,

    /// First/last key requested on an empty map or window.
    #[error("collection is empty")]
    EmptyCollection,

    /// A range view was built or narrowed with inverted or out-of-window bounds.
    #[error("invalid range: {0}")]
    InvalidRange(&'static str),

    /// A cursor was advanced past its end.
    #[error("iterator is exhausted")]
    IteratorExhausted,
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
