//! Audit record for one persisted generation run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable id of a generation run.
pub type RunId = Uuid;

/// Generator that produced a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Cycle,
    Transit,
    Batch,
    /// Copy of an earlier plan for a shifted cohort.
    Mirror,
}

impl RunKind {
    /// Stable string stored in `assignment_runs.kind`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cycle => "cycle",
            Self::Transit => "transit",
            Self::Batch => "batch",
            Self::Mirror => "mirror",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRun {
    pub id: RunId,
    pub kind: RunKind,
    /// JSON-encoded generation parameters.
    pub params: String,
    pub row_count: usize,
}

impl AssignmentRun {
    /// Creates a run record with a fresh id.
    pub fn new(kind: RunKind, params: impl Into<String>, row_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            params: params.into(),
            row_count,
        }
    }
}
