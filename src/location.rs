//! Grid coordinate primitives: locations, offsets, sizes and ranges.
//!
//! All coordinates are 1-based, mirroring the host format: columns span
//! `A..XFD` (1..=16384) and rows `1..=1048576`. Out-of-domain values are
//! representable but "incorrect" — they format as raw numbers instead of
//! column letters so a bad address stays visible in diagnostics.

use std::fmt;
use std::ops::{Add, Sub};

use crate::error::{Result, XlwriteError};

/// Hard column ceiling of the host format (`XFD`).
pub const MAX_COLUMN: i32 = 16_384;

/// Hard row ceiling of the host format.
pub const MAX_ROW: i32 = 1_048_576;

/// One grid cell address, 1-based on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

/// Relative displacement between locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

/// Rectangle extent. Negative on either axis is "degenerate" and rejected
/// wherever a real rectangle is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// Rectangle on the grid: a top-left corner plus an extent.
///
/// Both axes are closed intervals: `right()`/`bottom()` are the last column
/// and row inside the rectangle, not one past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub left_top: Location,
    pub size: Size,
}

impl Location {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether the address lies inside the host format's hard ceilings.
    #[must_use]
    pub const fn is_correct(&self) -> bool {
        self.x >= 1 && self.x <= MAX_COLUMN && self.y >= 1 && self.y <= MAX_ROW
    }

    /// Parse an address like `"C5"` (case-insensitive, surrounding whitespace
    /// and `$` anchors tolerated).
    ///
    /// # Errors
    /// Returns [`XlwriteError::CellRef`] for malformed text or decoded
    /// coordinates outside `[1,16384]×[1,1048576]`.
    pub fn parse(text: &str) -> Result<Self> {
        let bad = || XlwriteError::CellRef(text.to_string());

        let mut col: i32 = 0;
        let mut row: i32 = 0;
        let mut saw_col = false;
        let mut saw_row = false;

        for &b in text.trim().as_bytes() {
            if b == b'$' {
                continue;
            }
            if b.is_ascii_alphabetic() {
                if saw_row {
                    // Letters after digits ("A1B") are not an address.
                    return Err(bad());
                }
                col = col * 26 + i32::from(b.to_ascii_uppercase() - b'A') + 1;
                if col > MAX_COLUMN {
                    return Err(bad());
                }
                saw_col = true;
            } else if b.is_ascii_digit() {
                row = row * 10 + i32::from(b - b'0');
                if row > MAX_ROW {
                    return Err(bad());
                }
                saw_row = true;
            } else {
                return Err(bad());
            }
        }

        let loc = Self::new(col, row);
        if !saw_col || !saw_row || !loc.is_correct() {
            return Err(bad());
        }
        Ok(loc)
    }
}

impl Add<Offset> for Location {
    type Output = Location;

    fn add(self, rhs: Offset) -> Location {
        Location::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_correct() {
            write!(f, "{}{}", column_letters(self.x), self.y)
        } else {
            write!(f, "({},{})", self.x, self.y)
        }
    }
}

impl Offset {
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

impl Size {
    /// A single cell.
    pub const CELL: Size = Size::new(1, 1);

    /// The empty extent.
    pub const EMPTY: Size = Size::new(0, 0);

    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Negative extent on either axis; no rectangle can have one.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.width < 0 || self.height < 0
    }

    /// Zero area (but still a well-formed extent).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Sub<Offset> for Size {
    type Output = Size;

    fn sub(self, rhs: Offset) -> Size {
        Size::new(self.width - rhs.dx, self.height - rhs.dy)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Range {
    #[must_use]
    pub const fn new(left_top: Location, size: Size) -> Self {
        Self { left_top, size }
    }

    /// Build a range from its two corners.
    ///
    /// # Errors
    /// Returns [`XlwriteError::InvalidArgument`] when `right_bottom` precedes
    /// `left_top` on either axis.
    pub fn from_corners(left_top: Location, right_bottom: Location) -> Result<Self> {
        let size = Size::new(
            right_bottom.x - left_top.x + 1,
            right_bottom.y - left_top.y + 1,
        );
        // A corner-built range covers its corners, so it is at least 1x1;
        // width or height 0 means the corners crossed by exactly one.
        if size.is_degenerate() || size.is_empty() {
            return Err(XlwriteError::InvalidArgument(format!(
                "range corners out of order: {left_top} .. {right_bottom}"
            )));
        }
        Ok(Self::new(left_top, size))
    }

    /// Parse a range like `"A1:C5"`, or a single address as a 1×1 range.
    ///
    /// # Errors
    /// Returns [`XlwriteError::CellRef`] for malformed text.
    pub fn parse(text: &str) -> Result<Self> {
        match text.split_once(':') {
            Some((start, end)) => {
                let left_top = Location::parse(start)?;
                let right_bottom = Location::parse(end)?;
                Self::from_corners(left_top, right_bottom)
                    .map_err(|_| XlwriteError::CellRef(text.to_string()))
            }
            None => Ok(Self::new(Location::parse(text)?, Size::CELL)),
        }
    }

    /// Last column inside the rectangle.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.left_top.x + self.size.width - 1
    }

    /// Last row inside the rectangle.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.left_top.y + self.size.height - 1
    }

    #[must_use]
    pub const fn right_bottom(&self) -> Location {
        Location::new(self.right(), self.bottom())
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Closed-interval containment test for a single cell.
    #[must_use]
    pub const fn contains(&self, loc: Location) -> bool {
        loc.x >= self.left_top.x
            && loc.x <= self.right()
            && loc.y >= self.left_top.y
            && loc.y <= self.bottom()
    }

    /// Whether `other` lies entirely inside `self`.
    #[must_use]
    pub const fn contains_range(&self, other: &Range) -> bool {
        if other.is_empty() {
            // An empty rectangle occupies no cells; its anchor must still be
            // inside so layout arithmetic stays within the viewport.
            return self.contains(other.left_top);
        }
        self.contains(other.left_top) && self.contains(other.right_bottom())
    }

    /// AABB overlap test on closed intervals.
    #[must_use]
    pub const fn intersects(&self, other: &Range) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left_top.x <= other.right()
            && other.left_top.x <= self.right()
            && self.left_top.y <= other.bottom()
            && other.left_top.y <= self.bottom()
    }

    /// Smallest rectangle containing both operands.
    #[must_use]
    pub fn minimal_bounding(&self, other: &Range) -> Range {
        let left_top = Location::new(
            self.left_top.x.min(other.left_top.x),
            self.left_top.y.min(other.left_top.y),
        );
        let right_bottom = Location::new(
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        );
        Range::new(
            left_top,
            Size::new(
                right_bottom.x - left_top.x + 1,
                right_bottom.y - left_top.y + 1,
            ),
        )
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.left_top, self.right_bottom())
    }
}

/// Convert a 1-based column index to column letters (A, B, ..., Z, AA, ...).
#[must_use]
pub fn column_letters(col: i32) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        n -= 1;
        let c = char::from(b'A' + u8::try_from(n % 26).unwrap_or(0));
        result.insert(0, c);
        n /= 26;
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_span_the_alphabet_boundaries() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(702), "ZZ");
        assert_eq!(column_letters(703), "AAA");
        assert_eq!(column_letters(MAX_COLUMN), "XFD");
    }

    #[test]
    fn incorrect_locations_print_raw_numbers() {
        assert_eq!(Location::new(0, 5).to_string(), "(0,5)");
        assert_eq!(Location::new(MAX_COLUMN + 1, 1).to_string(), "(16385,1)");
        assert_eq!(Location::new(3, 2).to_string(), "C2");
    }

    #[test]
    fn parse_tolerates_case_whitespace_and_anchors() {
        let loc = Location::parse("  $xfd$1048576 ").unwrap();
        assert_eq!(loc, Location::new(MAX_COLUMN, MAX_ROW));
    }

    #[test]
    fn parse_rejects_out_of_domain_and_garbage() {
        assert!(Location::parse("XFE1").is_err());
        assert!(Location::parse("A1048577").is_err());
        assert!(Location::parse("A0").is_err());
        assert!(Location::parse("17").is_err());
        assert!(Location::parse("A1B").is_err());
        assert!(Location::parse("").is_err());
    }

    #[test]
    fn from_corners_rejects_inverted_rectangles() {
        // Crossed by one on a single axis: the implied width/height is 0.
        assert!(Range::from_corners(Location::new(3, 3), Location::new(2, 5)).is_err());
        assert!(Range::from_corners(Location::new(3, 3), Location::new(5, 2)).is_err());
        // Crossed on both axes: negative extent.
        assert!(Range::from_corners(Location::new(5, 5), Location::new(2, 2)).is_err());
        // Equal corners are the smallest valid rectangle.
        let cell = Range::from_corners(Location::new(3, 3), Location::new(3, 3)).unwrap();
        assert_eq!(cell.size, Size::CELL);
        let r = Range::from_corners(Location::new(2, 2), Location::new(4, 5)).unwrap();
        assert_eq!(r.size, Size::new(3, 4));
        assert_eq!(r.to_string(), "B2:D5");
    }
}
