//! Filesystem port for the task-state directory and generated artifacts.

use std::path::Path;

use super::PortError;

/// Provides filesystem access for reading and writing files.
///
/// Every touch of the on-disk task state goes through this trait, so the
/// materializer and runner can be pointed at an in-memory store in tests.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, PortError>;

    /// Writes the given contents to a file, creating or overwriting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError>;

    /// Returns `true` if the path exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Lists the entry names in a directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a directory or cannot be read.
    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError>;

    /// Creates a directory and all missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if any component cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<(), PortError>;

    /// Renames `from` to `to`, replacing `to` if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is missing or the rename fails.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), PortError>;

    /// Removes a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be removed.
    fn remove_file(&self, path: &Path) -> Result<(), PortError>;
}
