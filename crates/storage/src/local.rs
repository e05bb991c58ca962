//! Local filesystem storage.
//!
//! Every path handed to or returned from a [`LocalBackend`] is relative to its
//! root and goes through [`validate_path`] first, so nothing can be read from
//! or written to outside of it.

use crate::error::{ErrorKind, Result};
use crate::{FileInfo, validate_path};
use exn::ResultExt;
use filetime::FileTime;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}
impl LocalBackend {
    /// Opens `root`, creating it (and its parents) if it doesn't exist yet.
    ///
    /// # Errors
    /// [`InvalidPath`](ErrorKind::InvalidPath) if `root` exists but isn't a
    /// directory, or whatever creating it failed with.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = Self::absolute_root(root.as_ref())?;
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            fs::create_dir_all(&root).map_err(|e| ErrorKind::io(e, &root))?;
        }
        Ok(Self { root })
    }

    /// Opens `root`, which must already exist as a directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = Self::absolute_root(root.as_ref())?;
        match fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => Ok(Self { root }),
            Ok(_) => exn::bail!(ErrorKind::InvalidPath(root)),
            Err(e) => Err(ErrorKind::io(e, &root).into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the absolute path for a relative storage path.
    pub fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        Ok(self.root.join(validate_path(path)?))
    }

    /// Convert an absolute path below the root back to a relative storage path.
    pub fn relative_path(&self, absolute: impl AsRef<Path>) -> Result<PathBuf> {
        let absolute = absolute.as_ref();
        let relative = absolute
            .strip_prefix(&self.root)
            .or_raise(|| ErrorKind::InvalidPath(absolute.to_path_buf()))?;
        validate_path(relative)
    }

    /// Lists every regular file below the root, sorted by path.
    ///
    /// Paths are compared as strings (not component-wise), so `a-b/x` sorts
    /// before `a/x`. A symlink to a regular file is listed under the link's
    /// own path with its target's size; symlinked directories are not
    /// descended into. Entries that can't be read (dangling links included)
    /// are logged and skipped; only a failure to read the root itself is an
    /// error.
    pub fn list(&self) -> Result<Vec<FileInfo>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    let path = e.path().unwrap_or(&self.root).to_path_buf();
                    return Err(ErrorKind::io(io::Error::from(e), path).into());
                },
                Err(e) => {
                    tracing::warn!(path = ?e.path(), error = %e, "Skipping unreadable entry");
                    continue;
                },
            };
            let metadata = match entry.file_type() {
                kind if kind.is_file() => entry.metadata().map_err(io::Error::from),
                kind if kind.is_symlink() => fs::metadata(entry.path()),
                _ => continue,
            };
            let size = match metadata {
                Ok(metadata) if metadata.is_file() => metadata.len(),
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "Skipping unreadable file");
                    continue;
                },
            };
            files.push(FileInfo::new(self.relative_path(entry.path())?, size));
        }
        files.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));
        Ok(files)
    }

    /// Whether anything (file, directory, even a dangling symlink) occupies `path`.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool> {
        let absolute = self.absolute_path(path.as_ref())?;
        match fs::symlink_metadata(&absolute) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ErrorKind::io(e, path).into()),
        }
    }

    /// Copies the file at `source` (anywhere on disk) to `path` below the root.
    ///
    /// Missing parent directories are created. The destination is created
    /// exclusively: if anything already exists there, nothing is touched and
    /// [`AlreadyExists`](ErrorKind::AlreadyExists) is returned, so callers
    /// can check-then-copy without ever overwriting. Permissions and
    /// access/modification times are copied from `source`.
    pub fn copy_in(&self, source: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<FileInfo> {
        let (source, path) = (source.as_ref(), validate_path(path)?);
        let destination = self.root.join(&path);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| ErrorKind::io(e, parent))?;
        }
        let mut reader = File::open(source).map_err(|e| ErrorKind::io(e, source))?;
        let metadata = reader.metadata().map_err(|e| ErrorKind::io(e, source))?;
        let mut writer = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&destination)
            .map_err(|e| ErrorKind::io(e, &path))?;

        let copied = io::copy(&mut reader, &mut writer)
            .and_then(|size| {
                filetime::set_file_handle_times(
                    &writer,
                    Some(FileTime::from_last_access_time(&metadata)),
                    Some(FileTime::from_last_modification_time(&metadata)),
                )?;
                writer.set_permissions(metadata.permissions())?;
                Ok(size)
            })
            .map_err(|e| ErrorKind::io(e, &path));
        match copied {
            Ok(size) => Ok(FileInfo::new(path, size)),
            Err(e) => {
                // We created it, so a half-written file is ours to clean up.
                drop(writer);
                _ = fs::remove_file(&destination);
                Err(e.into())
            },
        }
    }

    fn absolute_root(root: &Path) -> Result<PathBuf> {
        if root.as_os_str().is_empty() {
            exn::bail!(ErrorKind::InvalidPath(root.to_path_buf()));
        }
        std::path::absolute(root).map_err(|e| ErrorKind::io(e, root).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::Deref;
    use std::time::{Duration, SystemTime};

    fn write(root: &Path, path: &str, contents: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_new_creates_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("nested/output");
        let backend = LocalBackend::new(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(backend.root(), root);
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "file.txt", "x");
        let file = temp_dir.path().join("file.txt");
        assert!(matches!(LocalBackend::new(&file).unwrap_err().deref(), ErrorKind::InvalidPath(_)));
        assert!(matches!(LocalBackend::open(&file).unwrap_err().deref(), ErrorKind::InvalidPath(_)));
        let missing = temp_dir.path().join("missing");
        assert!(matches!(LocalBackend::open(&missing).unwrap_err().deref(), ErrorKind::NotFound(_)));
        assert!(!missing.exists());
    }

    #[test]
    fn test_absolute_and_relative_paths() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::open(temp_dir.path()).unwrap();
        let absolute = backend.absolute_path("2020/05/x.pdf").unwrap();
        assert_eq!(absolute, backend.root().join("2020/05/x.pdf"));
        assert_eq!(backend.relative_path(&absolute).unwrap(), Path::new("2020/05/x.pdf"));
        assert!(backend.absolute_path("../escape.pdf").is_err());
        assert!(backend.relative_path("/somewhere/else.pdf").is_err());
    }

    #[test]
    fn test_list_is_sorted_recursive_and_files_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "b/pdf/file.pdf", "1");
        write(temp_dir.path(), "a/html/deep/er/file.html", "22");
        write(temp_dir.path(), "a-b/file.txt", "333");
        fs::create_dir_all(temp_dir.path().join("empty/dir")).unwrap();
        let backend = LocalBackend::open(temp_dir.path()).unwrap();
        let files = backend.list().unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.to_str().unwrap()).collect();
        assert_eq!(paths, vec!["a-b/file.txt", "a/html/deep/er/file.html", "b/pdf/file.pdf"]);
        assert_eq!(files[0].size, 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_includes_symlinked_files() {
        use std::os::unix::fs::symlink;

        let outside = tempfile::tempdir().unwrap();
        write(outside.path(), "real.pdf", "12345");
        write(outside.path(), "dir/inner.pdf", "1");
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "U1/plain.pdf", "1");
        symlink(outside.path().join("real.pdf"), temp_dir.path().join("U1/link.pdf")).unwrap();
        symlink(outside.path().join("dir"), temp_dir.path().join("U1/linked-dir")).unwrap();
        symlink(outside.path().join("gone.pdf"), temp_dir.path().join("U1/dangling.pdf")).unwrap();

        let backend = LocalBackend::open(temp_dir.path()).unwrap();
        let files = backend.list().unwrap();
        assert_eq!(files, vec![FileInfo::new("U1/link.pdf", 5), FileInfo::new("U1/plain.pdf", 1)]);
    }

    #[test]
    fn test_exists() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "x/y.pdf", "1");
        let backend = LocalBackend::open(temp_dir.path()).unwrap();
        assert!(backend.exists("x/y.pdf").unwrap());
        assert!(backend.exists("x").unwrap());
        assert!(!backend.exists("x/z.pdf").unwrap());
    }

    #[test]
    fn test_copy_in_creates_directories_and_keeps_times() {
        let source_dir = tempfile::tempdir().unwrap();
        write(source_dir.path(), "source.pdf", "contents");
        let source = source_dir.path().join("source.pdf");
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_589_673_600);
        filetime::set_file_mtime(&source, FileTime::from_system_time(modified)).unwrap();

        let output = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(output.path()).unwrap();
        let copied = backend.copy_in(&source, "2020/05/Example_Title.pdf").unwrap();
        assert_eq!(copied, FileInfo::new("2020/05/Example_Title.pdf", 8));

        let destination = output.path().join("2020/05/Example_Title.pdf");
        assert_eq!(fs::read_to_string(&destination).unwrap(), "contents");
        assert_eq!(fs::metadata(&destination).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn test_copy_in_never_overwrites() {
        let source_dir = tempfile::tempdir().unwrap();
        write(source_dir.path(), "source.pdf", "new");
        let output = tempfile::tempdir().unwrap();
        write(output.path(), "taken.pdf", "old");
        let backend = LocalBackend::open(output.path()).unwrap();

        let err = backend.copy_in(source_dir.path().join("source.pdf"), "taken.pdf").unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::AlreadyExists(p) if p == Path::new("taken.pdf")));
        assert_eq!(fs::read_to_string(output.path().join("taken.pdf")).unwrap(), "old");
    }

    #[test]
    fn test_copy_in_missing_source_leaves_nothing_behind() {
        let output = tempfile::tempdir().unwrap();
        let backend = LocalBackend::open(output.path()).unwrap();
        let err = backend.copy_in(output.path().join("nope.pdf"), "dest.pdf").unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::NotFound(_)));
        assert!(!output.path().join("dest.pdf").exists());
    }
}
