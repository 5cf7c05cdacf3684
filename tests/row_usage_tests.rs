//! Occupancy bitmap tests: interval marking, conflict detection and the
//! documented AND-accumulation behavior above the leaf level.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use xlwrite::RowUsage;

const DOMAIN: u16 = 16_384;

#[test]
fn disjoint_intervals_mark_independently() {
    let mut usage = RowUsage::new();
    assert!(usage.try_mark(0, 10));
    assert!(usage.try_mark(12, 20));
    assert!(usage.try_mark(11, 11));
    // Across byte, band and half boundaries.
    assert!(usage.try_mark(1_000, 1_100));
    assert!(usage.try_mark(8_000, 8_400));
    assert!(usage.try_mark(16_000, 16_383));
}

#[test]
fn overlap_is_rejected_and_existing_bits_survive() {
    let mut usage = RowUsage::new();
    assert!(usage.try_mark(100, 200));
    assert!(!usage.try_mark(150, 160));
    assert!(!usage.try_mark(200, 210));
    assert!(!usage.try_mark(90, 100));
    for col in 100..=200 {
        assert!(usage.is_marked(col), "column {col} lost its mark");
    }
    assert!(!usage.is_marked(99));
}

#[test]
fn full_domain_mark_equals_single_column_marks() {
    let mut bulk = RowUsage::new();
    assert!(bulk.try_mark(0, DOMAIN - 1));

    let mut one_by_one = RowUsage::new();
    for col in 0..DOMAIN {
        assert!(one_by_one.try_mark(col, col), "column {col} failed");
    }

    for col in 0..DOMAIN {
        assert_eq!(bulk.is_marked(col), one_by_one.is_marked(col));
        assert!(bulk.is_marked(col));
    }

    // Either way the row is full now.
    assert!(!bulk.try_mark(0, 0));
    assert!(!one_by_one.try_mark(DOMAIN - 1, DOMAIN - 1));
}

#[test]
fn single_column_marks_at_edges() {
    let mut usage = RowUsage::new();
    assert!(usage.try_mark(0, 0));
    assert!(usage.try_mark(DOMAIN - 1, DOMAIN - 1));
    assert!(!usage.try_mark(0, 0));
    assert!(!usage.try_mark(DOMAIN - 1, DOMAIN - 1));
    assert!(usage.try_mark(1, DOMAIN - 2));
}

#[test]
fn byte_spanning_interval_checks_interior_bytes() {
    let mut usage = RowUsage::new();
    // Occupy a single bit in the middle of the would-be interior.
    assert!(usage.try_mark(24, 24));
    assert!(!usage.try_mark(3, 40));
    // The failed span must not have claimed its edge bytes at leaf level.
    assert!(usage.try_mark(3, 23));
    assert!(usage.try_mark(25, 40));
}

#[test]
fn failed_multi_band_mark_can_leave_earlier_bands_marked() {
    // Documented behavior: above the leaf, sub-intervals are all evaluated
    // and ANDed, so a conflict in a later band does not undo earlier bands.
    let mut usage = RowUsage::new();
    assert!(usage.try_mark(1_030, 1_030));
    assert!(!usage.try_mark(900, 1_100));
    assert!(usage.is_marked(900));
    assert!(usage.is_marked(1_023));
    // Band 1 conflicted as a unit; its free cells below the conflict stayed
    // free because the leaf checks before committing.
    assert!(usage.try_mark(1_024, 1_029));
}

#[test]
fn exact_band_cover_then_any_touch_conflicts() {
    let mut usage = RowUsage::new();
    assert!(usage.try_mark(2_048, 3_071));
    assert!(!usage.try_mark(2_048, 2_048));
    assert!(!usage.try_mark(3_071, 3_071));
    assert!(!usage.try_mark(2_500, 2_600));
    assert!(usage.try_mark(3_072, 3_072));
}
