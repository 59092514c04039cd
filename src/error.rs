//! Error types shared across components.
//!
//! Per-task failures inside a run are not errors at this level; they are
//! recorded as [`TaskErrorKind`] on each run result. The enums here cover
//! the failures that stop an operation outright.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogError;

/// Failures of the on-disk task store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file or directory operation failed.
    #[error("{action} {path}: {message}")]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// Offending path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// A record could not be encoded or decoded.
    #[error("malformed task record {path}: {source}")]
    Format {
        /// Offending path.
        path: PathBuf,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of task materialization.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// The state directory could not be created.
    #[error("cannot create state directory {path}: {message}")]
    StateDirectory {
        /// Offending path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// Records already exist and `--clean` was not requested.
    #[error("task records already exist: {} (use --clean to replace them)", ids.join(", "))]
    DuplicateTask {
        /// Ids that already have a record.
        ids: Vec<String>,
    },
    /// The task catalog failed its consistency checks.
    #[error("invalid task catalog: {0}")]
    Validation(#[from] CatalogError),
    /// Reading or writing a record failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of the prerequisite machinery itself (never of a probe).
#[derive(Debug, Error)]
pub enum PrereqError {
    /// A probe was configured with an unusable target.
    #[error("invalid probe {name}: {message}")]
    InvalidProbe {
        /// Probe name.
        name: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Failures that abort a whole demo run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The state directory exists but cannot be listed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a single task in a run did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskErrorKind {
    /// The workflow engine failed or could not be started.
    ExternalWorkflow,
    /// No readable persisted record exists for the task.
    MissingTaskState,
    /// The workflow call exceeded its configured bound.
    Timeout,
}

impl TaskErrorKind {
    /// Stable label used in printed summaries.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ExternalWorkflow => "ExternalWorkflowError",
            Self::MissingTaskState => "MissingTaskStateError",
            Self::Timeout => "TimeoutError",
        }
    }
}
