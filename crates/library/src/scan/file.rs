use std::path::{Component, Path, PathBuf};
use undump_storage::FileInfo;

/// A source file awaiting organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveItem {
    /// Absolute path of the file
    pub source: PathBuf,
    /// Path relative to the archive root
    pub relative: PathBuf,
    /// First segment of [`relative`](Self::relative), if there is a usable one
    pub identifier: Option<String>,
    /// File size in bytes, as listed
    pub size: u64,
}
impl ArchiveItem {
    pub fn new(root: &Path, file: FileInfo) -> Self {
        Self {
            source: root.join(&file.path),
            identifier: identifier(&file.path).map(str::to_string),
            relative: file.path,
            size: file.size,
        }
    }
}

/// The identifier an archive-relative path belongs to.
///
/// `None` when the path has no leading normal component, or when that
/// component isn't valid UTF-8 (identifiers name directories in the metadata
/// tree, and have to be spliced into an IRI).
///
/// ```
/// use std::path::Path;
/// use undump_library::scan::identifier;
/// assert_eq!(identifier(Path::new("U1/pdf/a.pdf")), Some("U1"));
/// assert_eq!(identifier(Path::new("loose.pdf")), Some("loose.pdf"));
/// assert_eq!(identifier(Path::new("../U1/a.pdf")), None);
/// ```
pub fn identifier(relative: &Path) -> Option<&str> {
    match relative.components().next()? {
        Component::Normal(segment) => segment.to_str(),
        _ => None,
    }
}
