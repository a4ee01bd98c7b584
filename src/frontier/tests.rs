use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::types::EvalMask;

fn collar_time(front: &[Event<Mark>]) -> f64 {
    let mut prev = 0.0;
    let mut total = 0.0;
    for &(tag, time) in front {
        if tag == Mark::Collar {
            total += time - prev;
        }
        prev = time;
    }
    total
}

#[test]
fn from_ranges_emits_alternating_events() {
    let front = from_ranges(vec![(1.0, 2.0), (4.0, 6.0)]);
    assert_eq!(
        front,
        vec![
            (Mark::Gap, 1.0),
            (Mark::Active, 2.0),
            (Mark::Gap, 4.0),
            (Mark::Active, 6.0),
        ]
    );
    assert!((active_time(&front) - 3.0).abs() < 1e-12);
}

#[test]
fn from_ranges_coalesces_overlapping_and_touching() {
    let front = from_ranges(vec![(0.0, 2.0), (1.5, 3.0), (3.0, 4.0)]);
    assert_eq!(front, vec![(Mark::Gap, 0.0), (Mark::Active, 4.0)]);
}

#[test]
fn from_ranges_is_order_independent() {
    let ranges = vec![(0.0, 1.0), (2.5, 3.5), (5.0, 9.0), (6.0, 7.0), (10.0, 11.0)];
    let expected = from_ranges(ranges.clone());
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let mut shuffled = ranges.clone();
        shuffled.shuffle(&mut rng);
        assert_eq!(from_ranges(shuffled), expected);
    }
}

#[test]
fn empty_timeline_gives_empty_frontier() {
    let front = from_ranges(Vec::new());
    assert!(front.is_empty());
    assert_eq!(active_time(&front), 0.0);
}

#[test]
fn apply_mask_keeps_contained_activity() {
    let front = from_ranges(vec![(1.0, 3.0)]);
    let mask = EvalMask::single(0.0, 10.0);
    let masked = apply_mask(&front, &mask);
    assert!((active_time(&masked) - 2.0).abs() < 1e-12);
}

#[test]
fn apply_mask_truncates_at_mask_end() {
    let front = from_ranges(vec![(1.0, 8.0)]);
    let mask = EvalMask::single(0.0, 5.0);
    let masked = apply_mask(&front, &mask);
    assert!((active_time(&masked) - 4.0).abs() < 1e-12);
}

#[test]
fn apply_mask_reopens_mid_active_range() {
    // Active over [1, 9], scored only on [4, 6]: a synthetic gap event at
    // the mask start keeps the frontier well-formed.
    let front = from_ranges(vec![(1.0, 9.0)]);
    let mask = EvalMask::single(4.0, 6.0);
    let masked = apply_mask(&front, &mask);
    assert_eq!(masked, vec![(Mark::Gap, 4.0), (Mark::Active, 6.0)]);
}

#[test]
fn apply_mask_never_exceeds_mask_budget() {
    let front = from_ranges(vec![(0.0, 4.0), (5.0, 9.0), (12.0, 20.0)]);
    let mask = EvalMask::new(vec![(1.0, 3.0), (6.0, 13.0)]);
    let masked = apply_mask(&front, &mask);
    let budget: f64 = mask.ranges.iter().map(|(s, e)| e - s).sum();
    assert!(active_time(&masked) <= budget + 1e-12);
}

#[test]
fn zero_length_masked_frontier_drops_everything() {
    let front = from_ranges(vec![(0.0, 10.0)]);
    let masked = apply_mask(&front, &EvalMask::new(Vec::new()));
    assert!(masked.is_empty());
}

#[test]
fn add_collar_zero_preserves_active_time() {
    let front = from_ranges(vec![(1.0, 3.0), (5.0, 8.0)]);
    let collared = add_collar(&front, 0.0);
    assert!((active_time(&collared) - active_time(&front)).abs() < 1e-12);
    assert_eq!(collar_time(&collared), 0.0);
}

#[test]
fn add_collar_time_is_monotone_in_collar() {
    let front = from_ranges(vec![(1.0, 3.0), (5.0, 8.0), (9.0, 12.0)]);
    let mut prev = 0.0;
    for collar in [0.0, 0.1, 0.25, 0.5, 1.0, 3.0] {
        let total = collar_time(&add_collar(&front, collar));
        assert!(total >= prev - 1e-12, "collar {collar} shrank no-score time");
        prev = total;
    }
}

#[test]
fn add_collar_clamps_at_zero() {
    let front = from_ranges(vec![(0.1, 2.0)]);
    let collared = add_collar(&front, 0.5);
    assert_eq!(collared.first().map(|e| e.1), Some(0.0));
}

#[test]
fn add_collar_coalesces_overlapping_zones() {
    // Boundaries at 1, 2, 3, 4 with a wide collar collapse into one zone.
    let front = from_ranges(vec![(1.0, 2.0), (3.0, 4.0)]);
    let collared = add_collar(&front, 1.0);
    assert_eq!(collared, vec![(Mark::Gap, 0.0), (Mark::Collar, 5.0)]);
}

#[test]
fn merge_tracks_both_inputs() {
    let a = from_ranges(vec![(0.0, 2.0)]);
    let b = from_ranges(vec![(1.0, 3.0)]);
    let merged = merge(&a, &b, Mark::Gap, Mark::Gap);
    assert_eq!(
        merged,
        vec![
            ((Mark::Gap, Mark::Gap), 0.0),
            ((Mark::Active, Mark::Gap), 1.0),
            ((Mark::Active, Mark::Active), 2.0),
            ((Mark::Gap, Mark::Active), 3.0),
        ]
    );
}

#[test]
fn merge_extends_shorter_input_with_tail_tag() {
    let a = from_ranges(vec![(0.0, 1.0)]);
    let b = from_ranges(vec![(0.0, 5.0)]);
    let merged = merge(&a, &b, Mark::Gap, Mark::Gap);
    assert_eq!(merged.last(), Some(&((Mark::Gap, Mark::Active), 5.0)));
}
