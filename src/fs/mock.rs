use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
}

/// In-memory file system
///
/// Paths are kept in a sorted map, so a directory always precedes its
/// children and walks come out in a stable order.
pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            root,
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.write_lock();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.write_lock();
        Self::ensure_parents(&mut files, &path);
    }

    /// Every path currently present, in sorted order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.read_lock().keys().cloned().collect()
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.files.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.files.write().unwrap_or_else(|e| e.into_inner())
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
            });
        }
    }

    fn entry_type(&self, path: &Path) -> Option<FileType> {
        let path = self.normalize_path(path);
        self.read_lock().get(&path).map(|e| e.file_type)
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.entry_type(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.entry_type(path) == Some(FileType::Directory)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.entry_type(path) == Some(FileType::File)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.normalize_path(path);
        let files = self.read_lock();
        let entry = files
            .get(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        entry
            .content
            .clone()
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let path = self.normalize_path(path);
        let parent_ok = path.parent().map(|p| self.is_dir(p)).unwrap_or(false);
        if !parent_ok {
            return Err(anyhow!("Parent directory missing for {:?}", path));
        }
        if self.is_dir(&path) {
            return Err(anyhow!("Is a directory: {:?}", path));
        }
        self.add_file(path, contents);
        Ok(())
    }

    fn append(&self, path: &Path, contents: &str) -> Result<()> {
        let path = self.normalize_path(path);
        let mut files = self.write_lock();
        let entry = files
            .get_mut(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;
        match entry.content.as_mut() {
            Some(existing) => {
                existing.push_str(contents);
                Ok(())
            }
            None => Err(anyhow!("Not a file: {:?}", path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if self.is_file(path) {
            return Err(anyhow!("File exists at {:?}", path));
        }
        self.add_dir(path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let path = self.normalize_path(path);
        self.write_lock().retain(|p, _| !p.starts_with(&path));
        Ok(())
    }

    fn walk(&self, root: &Path, skip: &dyn Fn(&Path) -> bool) -> Result<Vec<DirEntry>> {
        let root = self.normalize_path(root);
        if !self.is_dir(&root) {
            return Err(anyhow!("Directory not found: {:?}", root));
        }

        let files = self.read_lock();
        let mut pruned: Vec<PathBuf> = Vec::new();
        let mut entries = Vec::new();

        for (path, entry) in files.range(root.clone()..) {
            if !path.starts_with(&root) {
                break;
            }
            let Ok(relative) = path.strip_prefix(&root) else {
                continue;
            };
            if relative.as_os_str().is_empty() || pruned.iter().any(|p| relative.starts_with(p)) {
                continue;
            }
            if skip(relative) {
                pruned.push(relative.to_path_buf());
                continue;
            }
            entries.push(DirEntry {
                path: path.clone(),
                relative: relative.to_path_buf(),
                file_type: entry.file_type,
            });
        }

        Ok(entries)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64> {
        let content = self.read_to_string(from)?;
        self.write(to, &content)?;
        Ok(content.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file() {
        let fs = MockFileSystem::new();
        fs.add_file("test.txt", "hello");

        assert!(fs.exists(Path::new("/mock/test.txt")));
        assert!(fs.is_file(Path::new("/mock/test.txt")));
        assert!(fs.is_dir(Path::new("/mock")));
    }

    #[test]
    fn test_write_requires_parent() {
        let fs = MockFileSystem::new();
        assert!(fs.write(Path::new("/mock/missing/file"), "x").is_err());

        fs.create_dir_all(Path::new("/mock/present")).unwrap();
        fs.write(Path::new("/mock/present/file"), "x").unwrap();
        assert_eq!(fs.read_to_string(Path::new("/mock/present/file")).unwrap(), "x");
    }

    #[test]
    fn test_append() {
        let fs = MockFileSystem::new();
        fs.add_file("cfg", "a = 1\n");
        fs.append(Path::new("/mock/cfg"), "b = 2\n").unwrap();
        assert_eq!(fs.read_to_string(Path::new("/mock/cfg")).unwrap(), "a = 1\nb = 2\n");
        assert!(fs.append(Path::new("/mock/none"), "x").is_err());
    }

    #[test]
    fn test_remove_dir_all() {
        let fs = MockFileSystem::new();
        fs.add_file("tree/a/b.txt", "b");
        fs.add_file("tree2/c.txt", "c");

        fs.remove_dir_all(Path::new("/mock/tree")).unwrap();

        assert!(!fs.exists(Path::new("/mock/tree")));
        assert!(!fs.exists(Path::new("/mock/tree/a/b.txt")));
        assert!(fs.exists(Path::new("/mock/tree2/c.txt")));
    }

    #[test]
    fn test_walk_prunes_and_orders() {
        let fs = MockFileSystem::new();
        fs.add_file("proj/BUILD.gn", "");
        fs.add_file("proj/.git/HEAD", "ref");
        fs.add_file("proj/src/main.cc", "int main() {}");
        fs.add_file("projector/other.txt", "not under proj");

        let entries = fs
            .walk(Path::new("/mock/proj"), &|p| p == Path::new(".git"))
            .unwrap();
        let relatives: Vec<&Path> = entries.iter().map(|e| e.relative()).collect();

        assert_eq!(
            relatives,
            vec![
                Path::new("BUILD.gn"),
                Path::new("src"),
                Path::new("src/main.cc"),
            ]
        );
    }

    #[test]
    fn test_copy_file() {
        let fs = MockFileSystem::new();
        fs.add_file("a/bin", "binary");
        fs.add_dir("b");

        let bytes = fs
            .copy_file(Path::new("/mock/a/bin"), Path::new("/mock/b/bin"))
            .unwrap();
        assert_eq!(bytes, 6);
        assert_eq!(fs.read_to_string(Path::new("/mock/b/bin")).unwrap(), "binary");
        assert!(fs
            .copy_file(Path::new("/mock/a/none"), Path::new("/mock/b/none"))
            .is_err());
    }
}
