//! Task materializer: turns a catalog into persisted task records.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::catalog::{Catalog, TaskDescriptor};
use crate::config::DEMO_PROJECT;
use crate::context::ServiceContext;
use crate::error::{MaterializeError, StoreError};
use crate::store::{TaskRecord, TaskStore};

/// What [`Materializer::create`] should do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Phases to materialize; empty means all. The epic is always included.
    pub phases: Vec<u8>,
    /// Delete this project's existing records first.
    pub clean: bool,
    /// Use the concept catalog instead of the full one.
    pub concept_mode: bool,
    /// Validate and report without touching the filesystem.
    pub dry_run: bool,
}

/// Outcome of a materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Catalog that was materialized.
    pub catalog: Catalog,
    /// Directory the records live in.
    pub state_dir: PathBuf,
    /// Ids removed by `clean` (or that would be, on a dry run).
    pub removed: Vec<String>,
    /// Ids written (or that would be, on a dry run), in catalog order.
    pub written: Vec<String>,
    /// Existing epic reused as the parent span instead of being rewritten.
    pub reused_epic: Option<String>,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl MaterializeReport {
    /// Number of records written.
    #[must_use]
    pub fn count(&self) -> usize {
        self.written.len()
    }

    /// Path a given id is written to.
    #[must_use]
    pub fn path_of(&self, id: &str) -> PathBuf {
        self.state_dir.join(format!("{id}.json"))
    }
}

/// Writes catalog entries into the task-state directory.
pub struct Materializer<'a> {
    ctx: &'a ServiceContext,
    store: TaskStore<'a>,
}

impl<'a> Materializer<'a> {
    /// Creates a materializer writing to `state_dir`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, state_dir: &Path) -> Self {
        Self { ctx, store: TaskStore::new(ctx, state_dir) }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &TaskStore<'a> {
        &self.store
    }

    /// Previews the entries `create` would write. No side effects.
    #[must_use]
    pub fn list(&self, catalog: Catalog, phases: &[u8]) -> Vec<&'static TaskDescriptor> {
        catalog.select(phases)
    }

    /// Loads every persisted record belonging to the demo project.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory cannot be listed or a record
    /// cannot be read.
    pub fn persisted(&self) -> Result<Vec<TaskRecord>, StoreError> {
        Ok(self
            .store
            .load_all()?
            .into_iter()
            .filter(|r| r.project_id == DEMO_PROJECT)
            .collect())
    }

    /// Materializes the selected catalog entries.
    ///
    /// Without `clean`, an existing record for any selected task is a
    /// [`MaterializeError::DuplicateTask`] and nothing is written. An existing
    /// epic is not a conflict: it is kept and new tasks hang under its span.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError`] on catalog inconsistency, duplicate ids, an
    /// uncreatable state directory, or a failed record write.
    pub fn create(&self, options: &CreateOptions) -> Result<MaterializeReport, MaterializeError> {
        let catalog = Catalog::for_mode(options.concept_mode);
        catalog.validate()?;
        let selected = catalog.select(&options.phases);

        let removed = if options.clean { self.project_record_ids()? } else { Vec::new() };

        let mut reused_epic = None;
        if !options.clean {
            let mut duplicates = Vec::new();
            for task in &selected {
                if !self.store.exists(task.id) {
                    continue;
                }
                if task.is_epic() {
                    reused_epic = Some(task.id.to_string());
                } else {
                    duplicates.push(task.id.to_string());
                }
            }
            if !duplicates.is_empty() {
                return Err(MaterializeError::DuplicateTask { ids: duplicates });
            }
        }

        let written: Vec<String> = selected
            .iter()
            .filter(|t| reused_epic.as_deref() != Some(t.id))
            .map(|t| t.id.to_string())
            .collect();
        let report = MaterializeReport {
            catalog,
            state_dir: self.store.dir().to_path_buf(),
            removed,
            written,
            reused_epic,
            dry_run: options.dry_run,
        };
        if options.dry_run {
            debug!(count = report.count(), "dry run; state directory untouched");
            return Ok(report);
        }

        self.store.ensure_dir().map_err(|e| match e {
            StoreError::Io { path, message, .. } => {
                MaterializeError::StateDirectory { path, message }
            }
            other => MaterializeError::Store(other),
        })?;
        for id in &report.removed {
            self.store.remove(id)?;
            debug!(%id, "removed");
        }

        let mut parent_span = match &report.reused_epic {
            Some(id) => self.store.load(id)?.map(|epic| epic.span_id),
            None => None,
        };
        let now = self.ctx.clock.now();
        for task in selected.iter().filter(|t| report.written.iter().any(|w| w == t.id)) {
            let parent = if task.is_epic() { None } else { parent_span.clone() };
            let record = TaskRecord::from_descriptor(
                task,
                self.ctx.id_gen.trace_id(),
                self.ctx.id_gen.span_id(),
                parent,
                now,
            );
            if task.is_epic() {
                parent_span = Some(record.span_id.clone());
            }
            self.store.save(&record)?;
            debug!(id = task.id, "written");
        }
        info!(
            catalog = catalog.name(),
            written = report.count(),
            removed = report.removed.len(),
            dir = %report.state_dir.display(),
            "materialized demo tasks"
        );
        Ok(report)
    }

    fn project_record_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        for id in self.store.list_ids()? {
            match self.store.load(&id) {
                Ok(Some(record)) if record.project_id == DEMO_PROJECT => ids.push(id),
                Ok(_) => debug!(%id, "not a demo record; kept"),
                Err(e) => warn!(%id, error = %e, "unreadable record kept during clean"),
            }
        }
        Ok(ids)
    }
}
