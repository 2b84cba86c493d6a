//! Round-robin cycle assignment.
//!
//! # Responsibility
//! - Repeat every item `n_views` times and hand rows to participants by
//!   tiling the pool.
//! - Optionally shuffle whole rows so the (participant, item) set survives.
//!
//! # Invariants
//! - Each item id in `[1, n_items]` appears exactly `n_views` times.
//! - Row counts per participant differ by at most one; the earliest pool
//!   members absorb the remainder.
//! - With `n_views <= pool size`, the `n_views` viewers of one item are
//!   distinct participants.

use super::order::assign_view_order;
use super::random::RandomSource;
use super::{checked_rows, validate_pool, ConfigurationError, PlanResult};
use crate::model::assignment::{ParticipantId, Placement, ViewAssignment};

/// Builds the raw (participant, item) rows without view positions.
///
/// # Errors
/// - `EmptyParticipantPool` / `DuplicateParticipant` for an invalid pool.
/// - `ViewsExceedParticipants` when `n_views > participant_ids.len()`.
/// - `SizeOverflow` when `n_items * n_views` does not fit.
pub fn cycle_placements<R: RandomSource>(
    n_items: usize,
    n_views: usize,
    participant_ids: &[ParticipantId],
    shuffle: bool,
    rng: &mut R,
) -> PlanResult<Vec<Placement>> {
    validate_pool(participant_ids)?;
    if n_views > participant_ids.len() {
        return Err(ConfigurationError::ViewsExceedParticipants {
            n_views,
            participants: participant_ids.len(),
        });
    }

    let total = checked_rows(n_items, n_views, "n_items * n_views")?;
    let pool_size = participant_ids.len();
    // Item column repeats each id in place; participant column tiles the pool.
    let mut placements: Vec<Placement> = (0..total)
        .map(|row| {
            Placement::new(
                participant_ids[row % pool_size],
                (row / n_views) as i64 + 1,
            )
        })
        .collect();

    if shuffle {
        rng.shuffle(&mut placements);
    }

    Ok(placements)
}

/// Generates a complete cycle plan with per-participant view order.
///
/// `view_order` follows row order after the optional shuffle.
pub fn generate<R: RandomSource>(
    n_items: usize,
    n_views: usize,
    participant_ids: &[ParticipantId],
    shuffle: bool,
    rng: &mut R,
) -> PlanResult<Vec<ViewAssignment>> {
    let placements = cycle_placements(n_items, n_views, participant_ids, shuffle, rng)?;
    Ok(assign_view_order(placements))
}
