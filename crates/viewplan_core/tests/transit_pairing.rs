use std::collections::{BTreeMap, HashMap};
use viewplan_core::plan::transit::companion_distance;
use viewplan_core::{
    generate_paired, seeded_rng, ConfigurationError, ItemRole, TransitOptions, ViewAssignment,
};

fn options(delay: usize, swap: bool) -> TransitOptions {
    TransitOptions {
        delay,
        swap_before_interleave: swap,
    }
}

fn order_of(rows: &[ViewAssignment], participant: i64, item: i64) -> u32 {
    rows.iter()
        .find(|row| row.participant_id == participant && row.item_id == item)
        .map(|row| row.view_order)
        .unwrap()
}

#[test]
fn single_participant_stream_interleaves_rotated_companions() {
    let mut rng = seeded_rng(Some(42));
    let rows = generate_paired(4, 1, &[1], false, &mut rng, options(1, false)).unwrap();

    let items: Vec<i64> = rows.iter().map(|row| row.item_id).collect();
    assert_eq!(items, vec![1, 6, 2, 7, 3, 8, 4, 5]);
    let orders: Vec<u32> = rows.iter().map(|row| row.view_order).collect();
    assert_eq!(orders, (1..=8).collect::<Vec<u32>>());
    assert!(items.contains(&5));
}

#[test]
fn every_id_in_both_ranges_gets_n_views() {
    let mut rng = seeded_rng(Some(8));
    let rows = generate_paired(12, 3, &[1, 2, 3, 4, 5], true, &mut rng, options(4, true)).unwrap();

    assert_eq!(rows.len(), 2 * 12 * 3);
    let mut per_item: BTreeMap<i64, usize> = BTreeMap::new();
    for row in &rows {
        *per_item.entry(row.item_id).or_insert(0) += 1;
    }
    assert_eq!(per_item.keys().copied().collect::<Vec<_>>(), (1..=24i64).collect::<Vec<_>>());
    assert!(per_item.values().all(|&count| count == 3));
}

#[test]
fn companions_stay_with_the_primary_viewer() {
    let mut rng = seeded_rng(Some(31));
    let rows = generate_paired(9, 2, &[7, 8, 9], true, &mut rng, options(5, true)).unwrap();

    for row in &rows {
        if ItemRole::classify(row.item_id, 9) == Some(ItemRole::Primary) {
            assert!(rows
                .iter()
                .any(|other| other.participant_id == row.participant_id
                    && other.item_id == row.item_id + 9));
        }
    }
}

#[test]
fn view_order_is_recomputed_after_interleaving() {
    let mut rng = seeded_rng(Some(3));
    let rows = generate_paired(10, 2, &[1, 2, 3], true, &mut rng, options(2, true)).unwrap();

    let mut next: HashMap<i64, u32> = HashMap::new();
    for row in &rows {
        let expected = next.entry(row.participant_id).or_insert(0);
        *expected += 1;
        assert_eq!(row.view_order, *expected);
    }
}

#[test]
fn unswapped_distance_is_two_delay_minus_one_except_at_the_boundary() {
    let delay = 3;
    let n_items = 10;
    let mut rng = seeded_rng(Some(0));
    let rows = generate_paired(n_items, 1, &[1], false, &mut rng, options(delay, false)).unwrap();

    for item in 1..=n_items as i64 {
        let primary = order_of(&rows, 1, item);
        let companion = order_of(&rows, 1, item + n_items as i64);
        let row = (item - 1) as usize;
        let distance = primary.abs_diff(companion) as usize;
        assert_eq!(Some(distance), companion_distance(row, delay, n_items));
        if row >= delay {
            assert_eq!(distance, 2 * delay - 1);
        } else {
            assert!(distance > 2 * delay - 1, "boundary row {row} wraps");
        }
    }
}

#[test]
fn delay_at_or_beyond_length_wraps_instead_of_failing() {
    let pool = [1, 2];
    let wrapped =
        generate_paired(5, 2, &pool, false, &mut seeded_rng(Some(1)), options(13, false)).unwrap();
    let reduced =
        generate_paired(5, 2, &pool, false, &mut seeded_rng(Some(1)), options(3, false)).unwrap();
    assert_eq!(wrapped, reduced);

    let full =
        generate_paired(5, 2, &pool, false, &mut seeded_rng(Some(1)), options(10, false)).unwrap();
    let none =
        generate_paired(5, 2, &pool, false, &mut seeded_rng(Some(1)), options(0, false)).unwrap();
    assert_eq!(full, none);
}

#[test]
fn swap_mode_changes_order_but_not_pairs() {
    let pool = [1, 2, 3, 4];
    let mut plain =
        generate_paired(15, 2, &pool, false, &mut seeded_rng(Some(6)), options(2, false))
            .unwrap()
            .iter()
            .map(ViewAssignment::placement)
            .collect::<Vec<_>>();
    let mut swapped =
        generate_paired(15, 2, &pool, false, &mut seeded_rng(Some(6)), options(2, true))
            .unwrap()
            .iter()
            .map(ViewAssignment::placement)
            .collect::<Vec<_>>();

    assert_ne!(plain, swapped);
    plain.sort();
    swapped.sort();
    assert_eq!(plain, swapped);
}

#[test]
fn same_seed_gives_identical_paired_plans() {
    let pool: Vec<i64> = (1..=4).collect();
    let first = generate_paired(8, 3, &pool, true, &mut seeded_rng(Some(99)), options(3, true));
    let second = generate_paired(8, 3, &pool, true, &mut seeded_rng(Some(99)), options(3, true));
    assert_eq!(first, second);
}

#[test]
fn configuration_errors_propagate() {
    let mut rng = seeded_rng(Some(0));
    assert_eq!(
        generate_paired(4, 2, &[1], true, &mut rng, options(1, true)),
        Err(ConfigurationError::ViewsExceedParticipants {
            n_views: 2,
            participants: 1
        })
    );
}
