//! Path validation for locations inside a storage root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Normalizes a root-relative path and ensures it stays inside the root.
///
/// `.` components, repeated separators and leading/trailing separators are
/// dropped; `..` pops the previous component and is rejected if there is
/// nothing left to pop. Null bytes and Windows prefixes are rejected, as is
/// anything that normalizes to nothing.
///
/// ```
/// use std::path::Path;
/// use undump_storage::validate_path;
/// assert_eq!(validate_path("2020/05/Example_Title.pdf").unwrap(), Path::new("2020/05/Example_Title.pdf"));
/// assert_eq!(validate_path("/2020//./05/").unwrap(), Path::new("2020/05"));
/// assert_eq!(validate_path("2020/../1970/x.pdf").unwrap(), Path::new("1970/x.pdf"));
/// assert!(validate_path("../outside.pdf").is_err());
/// assert!(validate_path("./").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(original.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in original.components() {
        match component {
            Component::Normal(segment) if segment.as_encoded_bytes().contains(&0) => exn::bail!(invalid()),
            Component::Normal(segment) => normalized.push(segment),
            Component::CurDir | Component::RootDir => {},
            Component::ParentDir if normalized.pop() => {},
            Component::ParentDir | Component::Prefix(_) => exn::bail!(invalid()),
        }
    }
    if normalized.as_os_str().is_empty() {
        exn::bail!(invalid());
    }
    Ok(normalized)
}
