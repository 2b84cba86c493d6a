//! Batch partitioning with transit pairing at batch granularity.
//!
//! # Responsibility
//! - Split a shuffled catalogue into near-equal batches.
//! - Pair every batch row with a delayed companion, then hand whole batches
//!   to participants in a cyclic order.
//!
//! # Invariants
//! - Batches partition `[1, n_items]` exactly; sizes differ by at most one,
//!   larger batches first.
//! - A companion keeps the batch id of the row it was copied from, so a
//!   paired batch holds its primaries and their companions.
//! - Participant `k` receives batches `(k * per + j) % n_batches` for
//!   `j in 0..per`; no state is shared between participants.

use super::order::ViewCounter;
use super::random::RandomSource;
use super::transit::{pair_with_companions, TransitOptions};
use super::{checked_rows, validate_pool, ConfigurationError, PlanResult};
use crate::model::assignment::{Batch, BatchId, BatchViewAssignment, ItemId, ParticipantId};
use std::collections::HashMap;

/// Batch-variant policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub n_batches: usize,
    /// Row rotation applied to the companion rows.
    pub delay: usize,
    /// Whole batches handed to each participant.
    pub batches_per_participant: usize,
    pub swap_before_interleave: bool,
}

/// Shuffles `[1, n_items]` and splits it into `n_batches` contiguous chunks.
///
/// # Errors
/// - `ZeroBatches` when `n_batches == 0`.
/// - `BatchesExceedItems` when `n_batches > n_items`.
pub fn partition_items<R: RandomSource>(
    n_items: usize,
    n_batches: usize,
    rng: &mut R,
) -> PlanResult<Vec<Batch>> {
    validate_batch_count(n_items, n_batches)?;

    let mut items: Vec<ItemId> = (1..=n_items as i64).collect();
    rng.shuffle(&mut items);

    let base = n_items / n_batches;
    let extra = n_items % n_batches;
    let mut batches = Vec::with_capacity(n_batches);
    let mut start = 0;
    for index in 0..n_batches {
        let size = base + usize::from(index < extra);
        batches.push(Batch {
            id: index as BatchId,
            items: items[start..start + size].to_vec(),
        });
        start += size;
    }

    Ok(batches)
}

/// Applies transit pairing across the flattened batch rows and regroups the
/// result per batch, keeping interleaved order inside each batch.
pub fn pair_batches<R: RandomSource>(
    batches: &[Batch],
    n_items: usize,
    options: TransitOptions,
    rng: &mut R,
) -> Vec<Batch> {
    let rows: Vec<(BatchId, ItemId)> = batches
        .iter()
        .flat_map(|batch| batch.items.iter().map(move |&item_id| (batch.id, item_id)))
        .collect();
    let offset = n_items as i64;
    let paired = pair_with_companions(rows, options, rng, |&(batch_id, item_id)| {
        (batch_id, item_id + offset)
    });

    let slots: HashMap<BatchId, usize> = batches
        .iter()
        .enumerate()
        .map(|(slot, batch)| (batch.id, slot))
        .collect();
    let mut grouped: Vec<Batch> = batches
        .iter()
        .map(|batch| Batch {
            id: batch.id,
            items: Vec::with_capacity(batch.len() * 2),
        })
        .collect();
    // Every paired row carries a batch id copied from `batches`.
    for (batch_id, item_id) in paired {
        grouped[slots[&batch_id]].items.push(item_id);
    }
    grouped
}

/// Index of the batch handed to `participant_index` in its `slot`-th turn.
///
/// Returns `None` when `n_batches == 0` or the turn index overflows.
pub fn batch_for_slot(
    participant_index: usize,
    slot: usize,
    batches_per_participant: usize,
    n_batches: usize,
) -> Option<usize> {
    participant_index
        .checked_mul(batches_per_participant)?
        .checked_add(slot)?
        .checked_rem(n_batches)
}

/// Lists (participant, batch index) turns in participant then slot order.
pub fn assign_batches(
    participant_ids: &[ParticipantId],
    n_batches: usize,
    batches_per_participant: usize,
) -> PlanResult<Vec<(ParticipantId, usize)>> {
    validate_pool(participant_ids)?;
    if n_batches == 0 {
        return Err(ConfigurationError::ZeroBatches);
    }

    let capacity = participant_ids
        .len()
        .checked_mul(batches_per_participant)
        .ok_or(ConfigurationError::SizeOverflow("participant batch turns"))?;
    let mut turns = Vec::with_capacity(capacity);
    for (index, &participant_id) in participant_ids.iter().enumerate() {
        for slot in 0..batches_per_participant {
            let batch_index = batch_for_slot(index, slot, batches_per_participant, n_batches)
                .ok_or(ConfigurationError::SizeOverflow("participant batch turns"))?;
            turns.push((participant_id, batch_index));
        }
    }
    Ok(turns)
}

/// Partitions the catalogue, pairs it at batch level and expands the batch
/// turns into per-participant rows.
///
/// Each participant's stream is the concatenation of
/// `batches_per_participant` whole paired batches. Per-item view counts are
/// only as even as the batch cycle makes them.
///
/// # Errors
/// Pool, batch count, batch/item ratio and the turn count are validated
/// before any random draw.
pub fn partition_and_assign<R: RandomSource>(
    n_items: usize,
    participant_ids: &[ParticipantId],
    options: BatchOptions,
    rng: &mut R,
) -> PlanResult<Vec<BatchViewAssignment>> {
    validate_pool(participant_ids)?;
    validate_batch_count(n_items, options.n_batches)?;
    let turns = assign_batches(
        participant_ids,
        options.n_batches,
        options.batches_per_participant,
    )?;

    let batches = partition_items(n_items, options.n_batches, rng)?;
    let paired = pair_batches(
        &batches,
        n_items,
        TransitOptions {
            delay: options.delay,
            swap_before_interleave: options.swap_before_interleave,
        },
        rng,
    );

    let mut counter = ViewCounter::new();
    let mut rows = Vec::new();
    for (participant_id, batch_index) in turns {
        let batch = &paired[batch_index];
        rows.extend(batch.items.iter().map(|&item_id| BatchViewAssignment {
            participant_id,
            batch_id: batch.id,
            item_id,
            view_order: counter.next(participant_id),
        }));
    }
    Ok(rows)
}

fn validate_batch_count(n_items: usize, n_batches: usize) -> PlanResult<()> {
    if n_batches == 0 {
        return Err(ConfigurationError::ZeroBatches);
    }
    if n_batches > n_items {
        return Err(ConfigurationError::BatchesExceedItems { n_batches, n_items });
    }
    checked_rows(n_items, 1, "n_items")?;
    Ok(())
}
