use std::collections::{BTreeMap, HashMap, HashSet};
use viewplan_core::plan::cycle::cycle_placements;
use viewplan_core::{generate, seeded_rng, ConfigurationError, Placement, ViewAssignment};

fn counts_by<K: Ord>(rows: &[ViewAssignment], key: impl Fn(&ViewAssignment) -> K) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(key(row)).or_insert(0) += 1;
    }
    counts
}

#[test]
fn unshuffled_plan_matches_worked_example() {
    let mut rng = seeded_rng(Some(42));
    let rows = generate(4, 2, &[1, 2], false, &mut rng).unwrap();

    assert_eq!(rows.len(), 8);
    let items: Vec<i64> = rows.iter().map(|row| row.item_id).collect();
    assert_eq!(items, vec![1, 1, 2, 2, 3, 3, 4, 4]);
    for participant in [1, 2] {
        let orders: Vec<u32> = rows
            .iter()
            .filter(|row| row.participant_id == participant)
            .map(|row| row.view_order)
            .collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }
}

#[test]
fn every_item_gets_exactly_n_views() {
    let mut rng = seeded_rng(Some(5));
    let rows = generate(17, 3, &[4, 8, 15, 16, 23, 42], true, &mut rng).unwrap();

    let per_item = counts_by(&rows, |row| row.item_id);
    assert_eq!(per_item.len(), 17);
    assert!(per_item.values().all(|&count| count == 3));
}

#[test]
fn viewers_of_one_item_are_distinct() {
    let mut rng = seeded_rng(Some(9));
    let rows = generate(11, 4, &[1, 2, 3, 4, 5], true, &mut rng).unwrap();

    let mut viewers: HashMap<i64, HashSet<i64>> = HashMap::new();
    for row in &rows {
        assert!(viewers.entry(row.item_id).or_default().insert(row.participant_id));
    }
}

#[test]
fn participant_load_differs_by_at_most_one() {
    let mut rng = seeded_rng(Some(1));
    let rows = generate(7, 2, &[10, 20, 30, 40], true, &mut rng).unwrap();

    let per_participant = counts_by(&rows, |row| row.participant_id);
    assert_eq!(per_participant.len(), 4);
    let min = per_participant.values().min().copied().unwrap();
    let max = per_participant.values().max().copied().unwrap();
    assert!(max - min <= 1);
    // 14 rows over 4 participants: the first two pool members take the extra.
    assert_eq!(per_participant[&10], 4);
    assert_eq!(per_participant[&20], 4);
    assert_eq!(per_participant[&30], 3);
    assert_eq!(per_participant[&40], 3);
}

#[test]
fn view_order_is_contiguous_per_participant() {
    let mut rng = seeded_rng(Some(77));
    let rows = generate(13, 2, &[1, 2, 3], true, &mut rng).unwrap();

    let mut orders: HashMap<i64, Vec<u32>> = HashMap::new();
    for row in &rows {
        orders.entry(row.participant_id).or_default().push(row.view_order);
    }
    for (_, mut seen) in orders {
        let expected: Vec<u32> = (1..=seen.len() as u32).collect();
        assert_eq!(seen, expected, "view order must follow row order");
        seen.sort_unstable();
        assert_eq!(seen, expected);
    }
}

#[test]
fn shuffle_preserves_pair_multiset() {
    let pool = [3, 5, 7];
    let mut plain_rng = seeded_rng(Some(0));
    let mut shuffled_rng = seeded_rng(Some(123));
    let mut plain: Vec<Placement> = cycle_placements(9, 3, &pool, false, &mut plain_rng).unwrap();
    let mut shuffled: Vec<Placement> =
        cycle_placements(9, 3, &pool, true, &mut shuffled_rng).unwrap();

    assert_ne!(plain, shuffled);
    plain.sort();
    shuffled.sort();
    assert_eq!(plain, shuffled);
}

#[test]
fn same_seed_gives_identical_plans() {
    let pool: Vec<i64> = (1..=6).collect();
    let first = generate(20, 4, &pool, true, &mut seeded_rng(Some(2024))).unwrap();
    let second = generate(20, 4, &pool, true, &mut seeded_rng(Some(2024))).unwrap();
    let other = generate(20, 4, &pool, true, &mut seeded_rng(Some(2025))).unwrap();

    assert_eq!(first, second);
    assert_ne!(first, other);
}

#[test]
fn invalid_pools_are_rejected_before_generation() {
    let mut rng = seeded_rng(Some(0));
    assert_eq!(
        generate(3, 1, &[], true, &mut rng),
        Err(ConfigurationError::EmptyParticipantPool)
    );
    assert_eq!(
        generate(3, 1, &[2, 2], true, &mut rng),
        Err(ConfigurationError::DuplicateParticipant(2))
    );
    assert_eq!(
        generate(3, 3, &[1, 2], true, &mut rng),
        Err(ConfigurationError::ViewsExceedParticipants {
            n_views: 3,
            participants: 2
        })
    );
}
