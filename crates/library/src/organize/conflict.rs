use crate::organize::error::{ErrorKind as OrganizeErrorKind, Result as OrganizeResult};
use exn::ResultExt;
use std::ffi::OsString;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use undump_storage::LocalBackend;
use undump_storage::error::ErrorKind as StorageErrorKind;

/// Copies `source` to `intended` (relative to the output root), or to the first
/// free disambiguated variant of it. Returns where the file actually went.
///
/// An occupied path is never written to. Occupancy is checked first, and the
/// copy itself only ever creates new files: if a candidate is taken between
/// the check and the copy, the next candidate is tried instead. The counter
/// has no upper bound, so this only returns once a copy succeeded or failed.
pub(crate) fn copy_unique(
    output: &LocalBackend,
    source: &Path,
    intended: &Path,
    identifier: &str,
) -> OrganizeResult<PathBuf> {
    let mut attempt = 0;
    loop {
        let candidate = match attempt {
            0 => intended.to_path_buf(),
            n => disambiguated(intended, identifier, n),
        };
        let taken = output.exists(&candidate).or_raise(|| OrganizeErrorKind::Storage)?;
        if taken && attempt == 0 {
            tracing::warn!(
                destination = %intended.display(),
                "Destination exists, appending identifier"
            );
        }
        attempt += 1;
        if taken {
            continue;
        }
        match output.copy_in(source, &candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if matches!(e.deref(), StorageErrorKind::AlreadyExists(_)) => {
                tracing::debug!(destination = %candidate.display(), "Destination taken during copy, trying next");
            },
            Err(e) => return Err(e).or_raise(|| OrganizeErrorKind::Storage),
        }
    }
}

/// `<dir>/<stem>_<identifier>_<n>.<ext>` for an intended `<dir>/<stem>.<ext>`.
fn disambiguated(intended: &Path, identifier: &str, n: usize) -> PathBuf {
    let mut name = intended.file_stem().map(OsString::from).unwrap_or_default();
    name.push(format!("_{identifier}_{n}"));
    if let Some(extension) = intended.extension() {
        name.push(".");
        name.push(extension);
    }
    intended.with_file_name(name)
}
