//! Plan reuse across participant cohorts.
//!
//! A study may run a second cohort of the same size whose ids follow the
//! first cohort's ids. Mirroring shifts participant ids and keeps items and
//! view order as generated.

use super::{ConfigurationError, PlanResult};
use crate::model::assignment::{BatchViewAssignment, ViewAssignment};

/// Row that can be re-addressed to another participant id.
pub trait CohortRow: Copy {
    /// `None` when the shifted id overflows.
    fn with_participant_offset(self, offset: i64) -> Option<Self>;
}

impl CohortRow for ViewAssignment {
    fn with_participant_offset(self, offset: i64) -> Option<Self> {
        Some(Self {
            participant_id: self.participant_id.checked_add(offset)?,
            ..self
        })
    }
}

impl CohortRow for BatchViewAssignment {
    fn with_participant_offset(self, offset: i64) -> Option<Self> {
        Some(Self {
            participant_id: self.participant_id.checked_add(offset)?,
            ..self
        })
    }
}

/// Copies `rows` for a cohort whose ids are shifted by `participant_offset`.
pub fn mirror_for_cohort<T: CohortRow>(rows: &[T], participant_offset: i64) -> PlanResult<Vec<T>> {
    rows.iter()
        .map(|row| row.with_participant_offset(participant_offset))
        .collect::<Option<Vec<T>>>()
        .ok_or(ConfigurationError::SizeOverflow("participant id + offset"))
}
