//! Fragment stores.
//!
//! A store answers reads and existence checks for logical paths. The
//! filesystem store maps them under a content root; tests use an in-memory
//! store with the same contract.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read access to fragments addressed by logical path.
///
/// Implementations must be shareable across the compile worker threads.
pub trait FragmentStore: Send + Sync {
    /// Read the fragment at `path`.
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Whether a fragment file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a fragment directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Logical paths of the files directly inside `dir`, sorted by name.
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Fragment store backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct FsFragmentStore {
    root: PathBuf,
}

impl FsFragmentStore {
    /// Create a store rooted at `root`.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FragmentStore for FsFragmentStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(self.full_path(path))
    }

    fn exists(&self, path: &Path) -> bool {
        self.full_path(path).is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.full_path(path).is_dir()
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(self.full_path(dir))? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(dir.join(entry.file_name()));
            }
        }

        files.sort();
        Ok(files)
    }
}
