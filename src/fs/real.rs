use super::{DirEntry, FileSystem, FileType};
use anyhow::{Context, Result};
use filetime::FileTime;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use walkdir::WalkDir;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).with_context(|| format!("Failed to write file {:?}", path))
    }

    fn append(&self, path: &Path, contents: &str) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {:?} for appending", path))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to append to {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("Failed to create directory {:?}", path))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove directory {:?}", path)),
        }
    }

    fn walk(&self, root: &Path, skip: &dyn Fn(&Path) -> bool) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| match e.path().strip_prefix(root) {
                Ok(relative) => !skip(relative),
                Err(_) => true,
            });

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", root))?;
            let relative = entry
                .path()
                .strip_prefix(root)
                .context("Failed to strip prefix")?
                .to_path_buf();

            let file_type = if entry.file_type().is_dir() {
                FileType::Directory
            } else if entry.file_type().is_symlink() {
                FileType::Symlink
            } else {
                FileType::File
            };

            entries.push(DirEntry {
                path: entry.path().to_path_buf(),
                relative,
                file_type,
            });
        }

        Ok(entries)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64> {
        let bytes = fs::copy(from, to)
            .with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;

        let meta = fs::metadata(from).with_context(|| format!("Failed to stat {:?}", from))?;
        filetime::set_file_times(
            to,
            FileTime::from_last_access_time(&meta),
            FileTime::from_last_modification_time(&meta),
        )
        .with_context(|| format!("Failed to preserve timestamps on {:?}", to))?;

        Ok(bytes)
    }
}
