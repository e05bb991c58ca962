//! Archive enumeration.
//!
//! Every regular file below the archive root is a candidate. Each becomes an
//! [`ArchiveItem`] carrying the identifier it will be looked up by: the first
//! path segment below the root.

pub(crate) mod error;
mod file;

pub use self::file::{ArchiveItem, identifier};

use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::scan::error::{ErrorKind, Result as ScanResult};
use exn::ResultExt;
use tracing::instrument;
use undump_storage::LocalBackend;

/// Lists the archive in ascending path order, keeping only the first `limit`
/// files if one is given.
#[instrument(skip(archive), fields(root = %archive.root().display()))]
pub fn scan(archive: &LocalBackend, limit: Option<usize>) -> LibraryResult<Vec<ArchiveItem>> {
    scan_inner(archive, limit).or_raise(|| LibraryErrorKind::Scan)
}

fn scan_inner(archive: &LocalBackend, limit: Option<usize>) -> ScanResult<Vec<ArchiveItem>> {
    let mut files = archive.list().or_raise(|| ErrorKind::Storage)?;
    let total = files.len();
    if let Some(limit) = limit {
        files.truncate(limit);
    }
    tracing::debug!(total, selected = files.len(), "Listed archive");
    Ok(files.into_iter().map(|file| ArchiveItem::new(archive.root(), file)).collect())
}
