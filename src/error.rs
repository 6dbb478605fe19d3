//! Failure type shared by every fallible `ProbingMap` operation.

use thiserror::Error;

/// Errors returned by [`ProbingMap`](crate::ProbingMap).
///
/// Every failure is reported before the table is touched, so an `Err`
/// always leaves the map exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The key is absent, or only present as a tombstone.
    #[error("key not found")]
    NotFound,
    /// An explicit resize asked for fewer slots than there are live entries.
    #[error("cannot resize backing array to {requested} slots while holding {size} live entries")]
    InvalidLength { requested: usize, size: usize },
}
