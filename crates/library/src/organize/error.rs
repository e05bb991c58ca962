//! Error types for the [`organize`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// An organize error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for organize operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an organize failure.
///
/// Each variant identifies the subsystem that failed, allowing callers to
/// inspect the error tree without matching on opaque strings.
///
/// ### Operational Errors
/// - [`ErrorKind::Template`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Metadata`]
/// - [`ErrorKind::Storage`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The notice for the item's identifier exists but couldn't be used.
    Metadata,
    /// Creating directories or copying the file failed.
    Storage,
    /// The [`PathTemplate`](crate::PathTemplate) rendered an unusable path.
    Template,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage)
    }
}
