//! Assignment rows and batches.
//!
//! # Responsibility
//! - Define raw placements, per-participant view rows and batch rows.
//! - Classify item ids into primary/companion roles.
//!
//! # Invariants
//! - Primary items occupy `[1, n_items]`; companions occupy
//!   `[n_items + 1, 2 * n_items]`.
//! - `view_order` values are never zero.

use serde::{Deserialize, Serialize};

/// Pool member receiving a viewing sequence.
pub type ParticipantId = i64;

/// Catalogue entry shown to participants.
pub type ItemId = i64;

/// Batch label in `0..n_batches`.
pub type BatchId = i64;

/// Raw (participant, item) row without a view position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub participant_id: ParticipantId,
    pub item_id: ItemId,
}

impl Placement {
    pub fn new(participant_id: ParticipantId, item_id: ItemId) -> Self {
        Self {
            participant_id,
            item_id,
        }
    }

    /// Returns the same participant paired with the item shifted by `offset`.
    pub fn shifted(self, offset: i64) -> Self {
        Self {
            participant_id: self.participant_id,
            item_id: self.item_id + offset,
        }
    }
}

/// One row of a per-participant viewing plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewAssignment {
    pub participant_id: ParticipantId,
    pub item_id: ItemId,
    /// 1-based position inside the participant's own sequence.
    pub view_order: u32,
}

impl ViewAssignment {
    /// Drops the view position, keeping the (participant, item) pair.
    pub fn placement(&self) -> Placement {
        Placement::new(self.participant_id, self.item_id)
    }
}

/// One row of a batch-based viewing plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchViewAssignment {
    pub participant_id: ParticipantId,
    pub batch_id: BatchId,
    pub item_id: ItemId,
    /// 1-based position across all batches handed to the participant.
    pub view_order: u32,
}

/// A batch and its items in viewing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub items: Vec<ItemId>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Role of an item id relative to the catalogue size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemRole {
    /// Original catalogue item in `[1, n_items]`.
    Primary,
    /// Delayed counterpart in `[n_items + 1, 2 * n_items]`.
    Companion,
}

impl ItemRole {
    /// Classifies `item_id` for a catalogue of `n_items` primaries.
    ///
    /// Returns `None` for ids outside both ranges.
    pub fn classify(item_id: ItemId, n_items: usize) -> Option<Self> {
        let n = n_items as i64;
        if (1..=n).contains(&item_id) {
            Some(Self::Primary)
        } else if (n + 1..=2 * n).contains(&item_id) {
            Some(Self::Companion)
        } else {
            None
        }
    }

    /// Returns the primary id paired with `item_id`.
    pub fn primary_of(item_id: ItemId, n_items: usize) -> Option<ItemId> {
        match Self::classify(item_id, n_items)? {
            Self::Primary => Some(item_id),
            Self::Companion => Some(item_id - n_items as i64),
        }
    }
}
