//! Coordinate primitive tests: address parsing/formatting round-trips and
//! rectangle algebra on closed intervals.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use test_case::test_case;
use xlwrite::{Location, Range, Size, MAX_COLUMN, MAX_ROW};

// ============================================================================
// ADDRESS FORMATTING
// ============================================================================

#[test_case(1, 1, "A1")]
#[test_case(26, 9, "Z9")]
#[test_case(27, 10, "AA10")]
#[test_case(702, 3, "ZZ3")]
#[test_case(703, 3, "AAA3")]
#[test_case(16_384, 1_048_576, "XFD1048576")]
fn format_valid_locations(x: i32, y: i32, expected: &str) {
    assert_eq!(Location::new(x, y).to_string(), expected);
}

#[test_case(0, 1)]
#[test_case(16_385, 1)]
#[test_case(1, 0)]
#[test_case(1, 1_048_577)]
#[test_case(-3, 7)]
fn incorrect_locations_format_as_raw_numbers(x: i32, y: i32) {
    let text = Location::new(x, y).to_string();
    assert_eq!(text, format!("({x},{y})"));
}

// ============================================================================
// PARSING
// ============================================================================

#[test]
fn parse_format_round_trips_across_the_domain() {
    // Column letter boundaries plus interior samples; every row magnitude.
    let columns = [1, 2, 25, 26, 27, 52, 53, 701, 702, 703, 728, 16_383, MAX_COLUMN];
    let rows = [1, 9, 10, 99, 1_000, 65_536, 1_048_575, MAX_ROW];
    for &x in &columns {
        for &y in &rows {
            let loc = Location::new(x, y);
            let parsed = Location::parse(&loc.to_string()).unwrap();
            assert_eq!(parsed, loc);
        }
    }
}

#[test_case("a1", 1, 1; "lowercase")]
#[test_case("  C5  ", 3, 5; "surrounding whitespace")]
#[test_case("$D$7", 4, 7; "dollar anchors")]
#[test_case("xFd1", 16_384, 1; "mixed case ceiling")]
fn parse_is_lenient_about_presentation(text: &str, x: i32, y: i32) {
    assert_eq!(Location::parse(text).unwrap(), Location::new(x, y));
}

#[test_case("XFE1"; "column past ceiling")]
#[test_case("A1048577"; "row past ceiling")]
#[test_case("A0"; "row zero")]
#[test_case("42"; "row only")]
#[test_case("ABC"; "column only")]
#[test_case("A 1"; "interior whitespace")]
#[test_case(""; "empty")]
fn parse_rejects_invalid_addresses(text: &str) {
    assert!(Location::parse(text).is_err());
}

#[test]
fn range_parse_and_format_round_trip() {
    let range = Range::parse("B2:D5").unwrap();
    assert_eq!(range.left_top, Location::new(2, 2));
    assert_eq!(range.size, Size::new(3, 4));
    assert_eq!(range.to_string(), "B2:D5");

    // A single address is a 1x1 range.
    let cell = Range::parse("C3").unwrap();
    assert_eq!(cell.size, Size::CELL);

    assert!(Range::parse("D5:B2").is_err());
    // Corners crossed by exactly one column on the same row.
    assert!(Range::parse("C3:B3").is_err());
}

// ============================================================================
// RECTANGLE ALGEBRA
// ============================================================================

#[test]
fn range_contains_its_own_corners() {
    let range = Range::new(Location::new(3, 4), Size::new(5, 6));
    assert!(range.contains(range.left_top));
    assert!(range.contains(range.right_bottom()));
    assert!(!range.contains(Location::new(2, 4)));
    assert!(!range.contains(Location::new(8, 4)));
}

#[test]
fn minimal_bounding_is_idempotent_on_self() {
    let range = Range::new(Location::new(2, 3), Size::new(4, 2));
    assert_eq!(range.minimal_bounding(&range), range);
}

#[test]
fn minimal_bounding_covers_disjoint_operands() {
    let a = Range::new(Location::new(1, 1), Size::new(2, 2));
    let b = Range::new(Location::new(5, 7), Size::new(1, 1));
    let bounding = a.minimal_bounding(&b);
    assert_eq!(bounding, Range::new(Location::new(1, 1), Size::new(5, 7)));
    assert!(bounding.contains_range(&a));
    assert!(bounding.contains_range(&b));
}

#[test]
fn intersection_is_closed_interval_on_both_axes() {
    let a = Range::new(Location::new(1, 1), Size::new(3, 3));
    // Shares exactly the corner cell C3.
    let corner = Range::new(Location::new(3, 3), Size::new(3, 3));
    assert!(a.intersects(&corner));
    // One column to the right: disjoint.
    let beside = Range::new(Location::new(4, 1), Size::new(2, 5));
    assert!(!a.intersects(&beside));
    // Empty ranges intersect nothing.
    let empty = Range::new(Location::new(2, 2), Size::EMPTY);
    assert!(!a.intersects(&empty));
}

#[test]
fn degenerate_and_empty_sizes_are_distinct() {
    assert!(Size::new(-1, 3).is_degenerate());
    assert!(!Size::new(0, 3).is_degenerate());
    assert!(Size::new(0, 3).is_empty());
    assert!(!Size::CELL.is_empty());
}
