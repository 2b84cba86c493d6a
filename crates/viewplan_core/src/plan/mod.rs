//! Assignment generation algorithms.
//!
//! # Responsibility
//! - Turn (item count, view count, participant pool, delay, policy) into
//!   complete per-participant viewing plans.
//! - Keep generation pure: no I/O, no process-wide random state.
//!
//! # Invariants
//! - Configuration errors are raised before any row is produced.
//! - Every item id appears exactly `n_views` times in cycle/transit plans.
//! - `view_order` is contiguous and 1-based for every participant.
//! - Identical inputs and an identically seeded random source give
//!   identical output.

use crate::model::assignment::ParticipantId;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod batch;
pub mod cohort;
pub mod cycle;
pub mod order;
pub mod random;
pub mod transit;

pub type PlanResult<T> = Result<T, ConfigurationError>;

/// Parameters that make balanced generation impossible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    EmptyParticipantPool,
    DuplicateParticipant(ParticipantId),
    ViewsExceedParticipants { n_views: usize, participants: usize },
    ZeroBatches,
    BatchesExceedItems { n_batches: usize, n_items: usize },
    /// A derived row count or id does not fit the storage types.
    SizeOverflow(&'static str),
    /// Row addressed to a participant missing from the pool.
    UnregisteredParticipant(ParticipantId),
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyParticipantPool => write!(f, "participant pool is empty"),
            Self::DuplicateParticipant(id) => {
                write!(f, "participant id {id} appears more than once in the pool")
            }
            Self::ViewsExceedParticipants {
                n_views,
                participants,
            } => write!(
                f,
                "n_views ({n_views}) must be less than or equal to the number of participants ({participants})"
            ),
            Self::ZeroBatches => write!(f, "n_batches must be at least 1"),
            Self::BatchesExceedItems { n_batches, n_items } => write!(
                f,
                "n_batches ({n_batches}) must be less than or equal to n_items ({n_items})"
            ),
            Self::SizeOverflow(quantity) => write!(f, "{quantity} overflows the supported range"),
            Self::UnregisteredParticipant(id) => {
                write!(f, "participant id {id} is not registered")
            }
        }
    }
}

impl Error for ConfigurationError {}

/// Rejects empty pools and repeated participant ids.
pub(crate) fn validate_pool(participant_ids: &[ParticipantId]) -> PlanResult<()> {
    if participant_ids.is_empty() {
        return Err(ConfigurationError::EmptyParticipantPool);
    }

    let mut seen = HashSet::with_capacity(participant_ids.len());
    for &id in participant_ids {
        if !seen.insert(id) {
            return Err(ConfigurationError::DuplicateParticipant(id));
        }
    }

    Ok(())
}

/// Row count of a plan repeating `n_items` items `copies` times, with
/// companion ids up to `2 * n_items` still representable as `i64`.
pub(crate) fn checked_rows(
    n_items: usize,
    copies: usize,
    quantity: &'static str,
) -> PlanResult<usize> {
    let companion_max = n_items
        .checked_mul(2)
        .and_then(|max| i64::try_from(max).ok());
    match (companion_max, n_items.checked_mul(copies)) {
        (Some(_), Some(rows)) => Ok(rows),
        _ => Err(ConfigurationError::SizeOverflow(quantity)),
    }
}
