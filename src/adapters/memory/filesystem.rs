//! In-memory filesystem shared between clones.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::ports::filesystem::FileSystem;
use crate::ports::PortError;

/// In-memory filesystem keyed by absolute path.
///
/// Directories are implicit: a path "exists" as a directory when it was
/// created explicitly or when any file lives under it. Paths listed in
/// `read_only` reject writes and directory creation, which lets tests
/// simulate permission failures.
#[derive(Clone, Default)]
pub struct MemoryFileSystem {
    inner: Arc<Mutex<MemState>>,
}

#[derive(Default)]
struct MemState {
    files: BTreeMap<PathBuf, String>,
    dirs: Vec<PathBuf>,
    read_only: Vec<PathBuf>,
}

impl MemState {
    fn check_writable(&self, path: &Path) -> Result<(), PortError> {
        if self.read_only.iter().any(|ro| path.starts_with(ro)) {
            return Err(format!("permission denied: {}", path.display()).into());
        }
        Ok(())
    }
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `path` and everything below it as unwritable.
    pub fn deny_writes_under(&self, path: impl Into<PathBuf>) {
        self.lock().read_only.push(path.into());
    }

    /// Returns every file path currently stored, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }

    /// Returns a snapshot of every file and its contents.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        self.lock().files.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        let mut state = self.lock();
        state.check_writable(path)?;
        state.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.files.contains_key(path)
            || state.dirs.iter().any(|d| d.starts_with(path))
            || state.files.keys().any(|k| k.starts_with(path) && k != path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        if !self.exists(path) {
            return Err(format!("No such directory: {}", path.display()).into());
        }
        let state = self.lock();
        let mut names: Vec<String> = state
            .files
            .keys()
            .filter(|k| k.parent() == Some(path))
            .filter_map(|k| k.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), PortError> {
        let mut state = self.lock();
        state.check_writable(path)?;
        state.dirs.push(path.to_path_buf());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), PortError> {
        let mut state = self.lock();
        state.check_writable(to)?;
        let contents = state
            .files
            .remove(from)
            .ok_or_else(|| -> PortError { format!("File not found: {}", from.display()).into() })?;
        state.files.insert(to.to_path_buf(), contents);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<(), PortError> {
        let mut state = self.lock();
        state.check_writable(path)?;
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| format!("File not found: {}", path.display()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let fs = MemoryFileSystem::new();
        let other = fs.clone();
        fs.write(Path::new("/s/a.json"), "{}").unwrap();
        assert_eq!(other.read_to_string(Path::new("/s/a.json")).unwrap(), "{}");
    }

    #[test]
    fn list_dir_only_returns_direct_children() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("/s/a.json"), "").unwrap();
        fs.write(Path::new("/s/nested/b.json"), "").unwrap();
        assert_eq!(fs.list_dir(Path::new("/s")).unwrap(), vec!["a.json"]);
    }

    #[test]
    fn created_directory_exists_and_lists_empty() {
        let fs = MemoryFileSystem::new();
        fs.create_dir_all(Path::new("/state/demo")).unwrap();
        assert!(fs.exists(Path::new("/state")));
        assert!(fs.list_dir(Path::new("/state/demo")).unwrap().is_empty());
    }

    #[test]
    fn read_only_paths_reject_writes() {
        let fs = MemoryFileSystem::new();
        fs.deny_writes_under("/locked");
        assert!(fs.create_dir_all(Path::new("/locked/demo")).is_err());
        assert!(fs.write(Path::new("/locked/demo/a"), "x").is_err());
    }
}
