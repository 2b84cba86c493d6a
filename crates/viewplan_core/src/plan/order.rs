//! Per-participant view ordering.

use crate::model::assignment::{ParticipantId, Placement, ViewAssignment};
use std::collections::HashMap;

/// Running per-participant position counter.
#[derive(Debug, Default)]
pub struct ViewCounter {
    positions: HashMap<ParticipantId, u32>,
}

impl ViewCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next 1-based position for `participant_id`.
    pub fn next(&mut self, participant_id: ParticipantId) -> u32 {
        let position = self.positions.entry(participant_id).or_insert(0);
        *position += 1;
        *position
    }
}

/// Ranks each placement within the rows sharing its participant, in the
/// order given.
pub fn assign_view_order(placements: impl IntoIterator<Item = Placement>) -> Vec<ViewAssignment> {
    let mut counter = ViewCounter::new();
    placements
        .into_iter()
        .map(|placement| ViewAssignment {
            participant_id: placement.participant_id,
            item_id: placement.item_id,
            view_order: counter.next(placement.participant_id),
        })
        .collect()
}
