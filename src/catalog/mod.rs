//! Static demo task catalogs.
//!
//! Two closed tables exist: the full six-phase catalog (thirteen tasks plus
//! one epic) and the concept catalog (six tasks plus one epic). Both are
//! ordered by phase, and within a phase by intended execution order.

mod concept;
mod descriptor;
mod full;

use std::collections::HashSet;

use thiserror::Error;

pub use descriptor::{TaskDescriptor, TaskKind};

/// Highest demo phase number.
pub const MAX_PHASE: u8 = 6;

/// Consistency violations in a catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two entries share an id.
    #[error("duplicate task id {0}")]
    DuplicateId(String),
    /// An entry depends on an id that is not in the catalog.
    #[error("{task} depends on unknown task {missing}")]
    UnknownDependency {
        /// Entry declaring the dependency.
        task: String,
        /// Id that could not be found.
        missing: String,
    },
    /// The catalog does not hold exactly one epic.
    #[error("expected exactly one epic, found {0}")]
    EpicCount(usize),
    /// A phase holds the wrong number of tasks.
    #[error("phase {phase} has {actual} tasks, expected {expected}")]
    PhaseCount {
        /// Phase number.
        phase: u8,
        /// Tasks found.
        actual: usize,
        /// Tasks expected.
        expected: usize,
    },
    /// An id does not carry its phase marker.
    #[error("task id {id} does not match phase {phase}")]
    IdPattern {
        /// Offending id.
        id: String,
        /// Declared phase.
        phase: u8,
    },
}

/// Which catalog table to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Catalog {
    /// Full six-phase demo.
    #[default]
    Full,
    /// Reduced seven-record concept walkthrough.
    Concept,
}

impl Catalog {
    /// Selects the concept table when `concept_mode` is set.
    #[must_use]
    pub fn for_mode(concept_mode: bool) -> Self {
        if concept_mode {
            Self::Concept
        } else {
            Self::Full
        }
    }

    /// Every entry, epic first, in catalog order.
    #[must_use]
    pub fn entries(self) -> &'static [TaskDescriptor] {
        match self {
            Self::Full => full::TASKS,
            Self::Concept => concept::TASKS,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Concept => "concept",
        }
    }

    fn phase_counts(self) -> [usize; 6] {
        match self {
            Self::Full => full::PHASE_COUNTS,
            Self::Concept => concept::PHASE_COUNTS,
        }
    }

    /// Tasks of one phase, or of all phases when `phase` is `None`.
    ///
    /// The epic is never returned. An unknown phase yields an empty list.
    #[must_use]
    pub fn get_tasks(self, phase: Option<u8>) -> Vec<&'static TaskDescriptor> {
        self.entries()
            .iter()
            .filter(|t| !t.is_epic())
            .filter(|t| phase.is_none_or(|p| t.phase == p))
            .collect()
    }

    /// The single epic entry.
    #[must_use]
    pub fn epic(self) -> Option<&'static TaskDescriptor> {
        self.entries().iter().find(|t| t.is_epic())
    }

    /// Epic plus the tasks of the requested phases, in catalog order.
    ///
    /// An empty `phases` slice selects every phase.
    #[must_use]
    pub fn select(self, phases: &[u8]) -> Vec<&'static TaskDescriptor> {
        self.entries()
            .iter()
            .filter(|t| t.is_epic() || phases.is_empty() || phases.contains(&t.phase))
            .collect()
    }

    /// Looks up an entry by id.
    #[must_use]
    pub fn find(self, id: &str) -> Option<&'static TaskDescriptor> {
        self.entries().iter().find(|t| t.id == id)
    }

    /// Checks ids, dependencies, the epic, and per-phase counts.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] found.
    pub fn validate(self) -> Result<(), CatalogError> {
        validate_entries(self.entries(), &self.phase_counts())
    }
}

fn validate_entries(entries: &[TaskDescriptor], counts: &[usize; 6]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for task in entries {
        if !seen.insert(task.id) {
            return Err(CatalogError::DuplicateId(task.id.to_string()));
        }
        if !task.id.contains(&format!("-P{}-", task.phase)) {
            return Err(CatalogError::IdPattern { id: task.id.to_string(), phase: task.phase });
        }
    }

    for task in entries {
        if let Some(missing) = task.depends_on.iter().find(|d| !seen.contains(*d)) {
            return Err(CatalogError::UnknownDependency {
                task: task.id.to_string(),
                missing: (*missing).to_string(),
            });
        }
    }

    let epics = entries.iter().filter(|t| t.is_epic()).count();
    if epics != 1 {
        return Err(CatalogError::EpicCount(epics));
    }

    for (phase, &expected) in (1..=MAX_PHASE).zip(counts) {
        let actual = entries.iter().filter(|t| !t.is_epic() && t.phase == phase).count();
        if actual != expected {
            return Err(CatalogError::PhaseCount { phase, actual, expected });
        }
    }
    Ok(())
}
