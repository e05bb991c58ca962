//! Binary Error Types
//!
//! Everything here is a setup failure: the batch either never started, or
//! could not list the archive. Failures of individual files are logged and
//! counted instead.

use derive_more::{Display, Error};

/// A setup error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for the command line.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not parse masks")]
    Template,
    #[display("could not read the archive directory")]
    Archive,
    #[display("could not prepare the output directory")]
    Output,
}
