//! Property tests for the plan generators.

use proptest::prelude::*;
use std::collections::HashMap;
use viewplan_core::plan::batch::partition_items;
use viewplan_core::{generate, generate_paired, seeded_rng, TransitOptions, ViewAssignment};

/// (n_items, pool, n_views) with `n_views <= pool.len()`.
fn arb_plan_input() -> impl Strategy<Value = (usize, Vec<i64>, usize)> {
    (0usize..40, 1usize..9).prop_flat_map(|(n_items, pool_size)| {
        (
            Just(n_items),
            Just((1..=pool_size as i64).map(|id| id * 3).collect::<Vec<i64>>()),
            0..=pool_size,
        )
    })
}

fn view_counts(rows: &[ViewAssignment]) -> HashMap<i64, usize> {
    let mut counts = HashMap::new();
    for row in rows {
        *counts.entry(row.item_id).or_insert(0) += 1;
    }
    counts
}

fn orders_are_contiguous(rows: &[ViewAssignment]) -> bool {
    let mut next: HashMap<i64, u32> = HashMap::new();
    rows.iter().all(|row| {
        let expected = next.entry(row.participant_id).or_insert(0);
        *expected += 1;
        row.view_order == *expected
    })
}

proptest! {
    #[test]
    fn cycle_plans_cover_items_and_balance_participants(
        (n_items, pool, n_views) in arb_plan_input(),
        shuffle in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let rows = generate(n_items, n_views, &pool, shuffle, &mut seeded_rng(Some(seed))).unwrap();

        prop_assert_eq!(rows.len(), n_items * n_views);
        let counts = view_counts(&rows);
        for item in 1..=n_items as i64 {
            prop_assert_eq!(counts.get(&item).copied().unwrap_or(0), n_views);
        }

        let mut load: HashMap<i64, usize> = pool.iter().map(|&id| (id, 0)).collect();
        for row in &rows {
            *load.get_mut(&row.participant_id).unwrap() += 1;
        }
        let min = load.values().min().copied().unwrap();
        let max = load.values().max().copied().unwrap();
        prop_assert!(max - min <= 1);
        prop_assert!(orders_are_contiguous(&rows));
    }

    #[test]
    fn paired_plans_keep_pairs_with_their_viewer(
        (n_items, pool, n_views) in arb_plan_input(),
        delay in 0usize..60,
        swap in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let options = TransitOptions { delay, swap_before_interleave: swap };
        let rows = generate_paired(n_items, n_views, &pool, true, &mut seeded_rng(Some(seed)), options)
            .unwrap();

        prop_assert_eq!(rows.len(), 2 * n_items * n_views);
        let counts = view_counts(&rows);
        for item in 1..=2 * n_items as i64 {
            prop_assert_eq!(counts.get(&item).copied().unwrap_or(0), n_views);
        }

        let mut per_pair: HashMap<(i64, i64), i64> = HashMap::new();
        let offset = n_items as i64;
        for row in &rows {
            if row.item_id <= offset {
                *per_pair.entry((row.participant_id, row.item_id)).or_insert(0) += 1;
            } else {
                *per_pair.entry((row.participant_id, row.item_id - offset)).or_insert(0) -= 1;
            }
        }
        prop_assert!(per_pair.values().all(|&balance| balance == 0));
        prop_assert!(orders_are_contiguous(&rows));

        let again = generate_paired(n_items, n_views, &pool, true, &mut seeded_rng(Some(seed)), options)
            .unwrap();
        prop_assert_eq!(rows, again);
    }

    #[test]
    fn batches_partition_exactly(
        n_items in 1usize..60,
        batch_fraction in 0.0f64..1.0,
        seed in any::<u64>(),
    ) {
        let n_batches = 1 + ((n_items - 1) as f64 * batch_fraction) as usize;
        let batches = partition_items(n_items, n_batches, &mut seeded_rng(Some(seed))).unwrap();

        prop_assert_eq!(batches.len(), n_batches);
        let mut all: Vec<i64> = batches.iter().flat_map(|batch| batch.items.clone()).collect();
        all.sort_unstable();
        prop_assert_eq!(all, (1..=n_items as i64).collect::<Vec<i64>>());

        let min = batches.iter().map(|batch| batch.len()).min().unwrap();
        let max = batches.iter().map(|batch| batch.len()).max().unwrap();
        prop_assert!(max - min <= 1);
    }
}
