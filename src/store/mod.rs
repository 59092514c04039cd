//! Task store: persistence layer for task records.
//!
//! The store owns one directory per demo project and uses the `FileSystem`
//! port for all I/O. Layout:
//!
//! ```text
//! <state_root>/<project_id>/
//!   ├── DEMO-P0-EPIC.json
//!   ├── DEMO-P1-DASHBOARDS.json
//!   └── ...
//! ```
//!
//! Records are written to `<id>.json.tmp` and renamed into place, so an
//! interrupted write never leaves a truncated record behind.

mod record;

use std::path::{Path, PathBuf};

use crate::context::ServiceContext;
use crate::error::StoreError;

pub use record::{Priority, TaskRecord, TaskStatus, SCHEMA_VERSION};

const RECORD_EXT: &str = ".json";
const TMP_EXT: &str = ".json.tmp";

/// Persistence layer for task records.
pub struct TaskStore<'a> {
    ctx: &'a ServiceContext,
    dir: PathBuf,
}

impl<'a> TaskStore<'a> {
    /// Creates a store over `dir`. Nothing is touched until a method is called.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, dir: &Path) -> Self {
        Self { ctx, dir: dir.to_path_buf() }
    }

    /// The directory this store reads and writes.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the state directory if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        self.ctx.fs.create_dir_all(&self.dir).map_err(|e| StoreError::Io {
            action: "create directory",
            path: self.dir.clone(),
            message: e.to_string(),
        })
    }

    /// Lists ids of every record in the directory, sorted.
    ///
    /// A missing directory is an empty store. Files without the `.json`
    /// extension (including leftover temp files) are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory exists but cannot be listed.
    pub fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        if !self.ctx.fs.exists(&self.dir) {
            return Ok(Vec::new());
        }
        let entries = self.ctx.fs.list_dir(&self.dir).map_err(|e| StoreError::Io {
            action: "list",
            path: self.dir.clone(),
            message: e.to_string(),
        })?;
        Ok(entries
            .into_iter()
            .filter_map(|name| name.strip_suffix(RECORD_EXT).map(String::from))
            .collect())
    }

    /// Returns `true` if a record for `id` exists.
    #[must_use]
    pub fn exists(&self, id: &str) -> bool {
        self.ctx.fs.exists(&self.record_path(id))
    }

    /// Loads the record for `id`, or `None` when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or parsed.
    pub fn load(&self, id: &str) -> Result<Option<TaskRecord>, StoreError> {
        let path = self.record_path(id);
        if !self.ctx.fs.exists(&path) {
            return Ok(None);
        }
        let contents = self.ctx.fs.read_to_string(&path).map_err(|e| StoreError::Io {
            action: "read",
            path: path.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Format { path, source })
    }

    /// Loads every record in the directory, in id order.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError`] encountered.
    pub fn load_all(&self) -> Result<Vec<TaskRecord>, StoreError> {
        let mut records = Vec::new();
        for id in self.list_ids()? {
            if let Some(record) = self.load(&id)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Writes a record atomically, replacing any previous version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if encoding, writing, or the final rename fails.
    pub fn save(&self, record: &TaskRecord) -> Result<(), StoreError> {
        let path = self.record_path(&record.id);
        let json = serde_json::to_string_pretty(record)
            .map_err(|source| StoreError::Format { path: path.clone(), source })?;
        let tmp = self.dir.join(format!("{}{TMP_EXT}", record.id));
        self.ctx.fs.write(&tmp, &json).map_err(|e| StoreError::Io {
            action: "write",
            path: tmp.clone(),
            message: e.to_string(),
        })?;
        self.ctx.fs.rename(&tmp, &path).map_err(|e| StoreError::Io {
            action: "rename",
            path,
            message: e.to_string(),
        })
    }

    /// Deletes the record for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be removed.
    pub fn remove(&self, id: &str) -> Result<(), StoreError> {
        let path = self.record_path(id);
        self.ctx.fs.remove_file(&path).map_err(|e| StoreError::Io {
            action: "remove",
            path,
            message: e.to_string(),
        })
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}{RECORD_EXT}"))
    }
}
