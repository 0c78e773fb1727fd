//! File access for string-table sources

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Storage collaborator used to find and read string-table sources.
///
/// Implementations must visit files in a stable order for unchanged storage.
pub trait FileOps: Send + Sync + fmt::Debug {
    /// Read the full text of the file at `path`.
    ///
    /// # Errors
    ///
    /// Any I/O failure. A missing file must surface as
    /// [`io::ErrorKind::NotFound`].
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Recursively visit every regular file below `relative_dir`, resolved
    /// against [`root_path`](Self::root_path). Does nothing if the directory
    /// does not exist.
    fn enumerate(&self, relative_dir: &Path, visit: &mut dyn FnMut(&Path));

    /// Root that relative source locations are resolved against.
    fn root_path(&self) -> &Path;
}

/// [`FileOps`] over the local filesystem
#[derive(Debug, Clone)]
pub struct FsFileOps {
    root: PathBuf,
}

impl FsFileOps {
    /// Create file access rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl Default for FsFileOps {
    fn default() -> Self {
        Self::new(".")
    }
}

impl FileOps for FsFileOps {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn enumerate(&self, relative_dir: &Path, visit: &mut dyn FnMut(&Path)) {
        let dir = self.root.join(relative_dir);
        if !dir.is_dir() {
            debug!("Source directory does not exist: {:?}", dir);
            return;
        }

        for entry in WalkDir::new(&dir).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => visit(entry.path()),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry under {:?}: {}", dir, e),
            }
        }
    }

    fn root_path(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locale_strings_common::test_utils::write_fixture;

    #[test]
    fn test_enumerate_is_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "i18n/en/b.json", "{}");
        write_fixture(dir.path(), "i18n/en/a.json", "{}");
        write_fixture(dir.path(), "i18n/en/nested/c.json", "{}");

        let ops = FsFileOps::new(dir.path());
        let mut seen = Vec::new();
        ops.enumerate(Path::new("i18n/en"), &mut |p| {
            seen.push(p.strip_prefix(dir.path()).unwrap().to_path_buf());
        });

        assert_eq!(
            seen,
            vec![
                PathBuf::from("i18n/en/a.json"),
                PathBuf::from("i18n/en/b.json"),
                PathBuf::from("i18n/en/nested/c.json"),
            ]
        );
    }

    #[test]
    fn test_enumerate_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let ops = FsFileOps::new(dir.path());

        let mut count = 0;
        ops.enumerate(Path::new("nowhere"), &mut |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let ops = FsFileOps::new(dir.path());

        let err = ops.read(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
