//! Injectable random source for plan generation.
//!
//! # Responsibility
//! - Expose the two operations generators need: in-place shuffle and
//!   Bernoulli draws.
//! - Build a fresh generator per call; nothing is shared process-wide.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Stateful uniform random source consumed by the generators.
pub trait RandomSource {
    /// Shuffles `values` in place, uniformly.
    fn shuffle<T>(&mut self, values: &mut [T]);

    /// Returns `true` with probability `p`.
    ///
    /// `p <= 0` (or NaN) never succeeds; `p >= 1` always succeeds.
    fn bernoulli(&mut self, p: f64) -> bool;
}

impl<R: Rng> RandomSource for R {
    fn shuffle<T>(&mut self, values: &mut [T]) {
        SliceRandom::shuffle(values, self);
    }

    fn bernoulli(&mut self, p: f64) -> bool {
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.random_bool(p)
    }
}

/// Creates a generator for one generation call.
///
/// A given seed always yields the same stream; `None` seeds from the OS.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
