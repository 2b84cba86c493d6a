//! Transit pairing: every primary view gains a delayed companion view.
//!
//! # Responsibility
//! - Derive companion rows (`item_id + n_items`, same participant) from a
//!   raw cycle assignment.
//! - Rotate the companion table by `delay` rows, optionally swap pairs, and
//!   interleave primary/companion rows.
//!
//! # Invariants
//! - Output has exactly twice as many rows as the raw assignment.
//! - A participant holding primary `i` also holds companion `i + n_items`.
//! - Unswapped, the stream distance between a primary and its companion is
//!   `2 * delay - 1` except for the first `delay` rows, which wrap.
//! - `delay` is taken modulo the raw row count; it is never rejected.

use super::cycle::cycle_placements;
use super::order::assign_view_order;
use super::random::RandomSource;
use super::{checked_rows, ConfigurationError, PlanResult};
use crate::model::assignment::{ParticipantId, ViewAssignment};

/// Probability that a row pair is emitted companion-first when swapping.
pub const SWAP_PROBABILITY: f64 = 0.5;

/// Pairing policy shared by the per-participant and batch variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitOptions {
    /// Row rotation applied to the companion table.
    pub delay: usize,
    /// Randomly swap primary/companion per row index before interleaving.
    pub swap_before_interleave: bool,
}

/// Generates a paired plan: `2 * n_items * n_views` rows with per-participant
/// view order recomputed after interleaving.
///
/// # Errors
/// Same configuration errors as [`cycle_placements`], plus `SizeOverflow`
/// when the doubled row count does not fit.
pub fn generate_paired<R: RandomSource>(
    n_items: usize,
    n_views: usize,
    participant_ids: &[ParticipantId],
    shuffle: bool,
    rng: &mut R,
    options: TransitOptions,
) -> PlanResult<Vec<ViewAssignment>> {
    checked_rows(n_items, n_views, "n_items * n_views")?
        .checked_mul(2)
        .ok_or(ConfigurationError::SizeOverflow("paired row count"))?;
    let primary = cycle_placements(n_items, n_views, participant_ids, shuffle, rng)?;
    let offset = n_items as i64;
    let paired = pair_with_companions(primary, options, rng, |placement| placement.shifted(offset));
    Ok(assign_view_order(paired))
}

/// Interleaves `primary` rows with their rotated companions.
///
/// Output position `2k` holds primary-table row `k` and `2k + 1` holds
/// companion-table row `k`, where companion-table row `k` is the companion
/// of primary row `(k + delay) % len`. A swapped row index emits the two
/// entries in the opposite order. Swap decisions are drawn once per row,
/// only when swapping is enabled.
pub fn pair_with_companions<T, R, F>(
    primary: Vec<T>,
    options: TransitOptions,
    rng: &mut R,
    companion_of: F,
) -> Vec<T>
where
    T: Clone,
    R: RandomSource,
    F: Fn(&T) -> T,
{
    let len = primary.len();
    if len == 0 {
        return primary;
    }

    let mut companions: Vec<T> = primary.iter().map(&companion_of).collect();
    companions.rotate_left(options.delay % len);

    let swaps: Vec<bool> = if options.swap_before_interleave {
        (0..len).map(|_| rng.bernoulli(SWAP_PROBABILITY)).collect()
    } else {
        vec![false; len]
    };

    primary
        .into_iter()
        .zip(companions)
        .zip(swaps)
        .flat_map(|((first, second), swap)| {
            if swap {
                [second, first]
            } else {
                [first, second]
            }
        })
        .collect()
}

/// Stream distance between primary row `row` and its companion in an
/// unswapped interleave of `len` raw rows.
///
/// With `shift = delay % len`, rows at or after `shift` see `2 * shift - 1`
/// (or 1 when `shift` is zero); earlier rows pair with a companion near the
/// end of the stream. `None` when `row` is out of range or the stream
/// position does not fit in `usize`.
pub fn companion_distance(row: usize, delay: usize, len: usize) -> Option<usize> {
    if row >= len {
        return None;
    }
    let shift = delay % len;
    let companion_row = if row >= shift {
        row - shift
    } else {
        row + (len - shift)
    };
    let primary_position = row.checked_mul(2)?;
    let companion_position = companion_row.checked_mul(2)?.checked_add(1)?;
    Some(primary_position.abs_diff(companion_position))
}
