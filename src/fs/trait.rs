//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// An entry produced by [`FileSystem::walk`]
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    /// Path relative to the walk root
    pub relative: PathBuf,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// Abstraction over file system operations for testability
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Create or truncate a file with the given contents
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Append to an existing file, leaving its current bytes untouched
    fn append(&self, path: &Path, contents: &str) -> Result<()>;

    /// Create a directory and all missing parents
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Remove a directory tree; a missing directory is not an error
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// Recursively list everything below `root`
    ///
    /// `skip` receives paths relative to `root`; a directory it rejects is
    /// not descended into. Parents are always listed before their children.
    fn walk(&self, root: &Path, skip: &dyn Fn(&Path) -> bool) -> Result<Vec<DirEntry>>;

    /// Copy one file, preserving permissions and timestamps
    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64>;
}
