//! Per-row column occupancy tracking.
//!
//! `RowUsage` answers, for one output row, "is this column interval still
//! free?" and marks it in the same call. The structure is a fixed 3-level
//! radix tree over the 16384-column domain: two lazily allocated halves of
//! 8192 columns, each fanning out into 8 bands of 1024 columns, each band
//! backed by a 128-byte leaf bitmap. Nothing is allocated per cell; a fully
//! covered band collapses to a zero-sized "all bits set" marker instead of a
//! distinct all-ones leaf.

/// Number of columns a `RowUsage` covers (0-based indices `0..16384`).
pub const COLUMN_DOMAIN: u16 = 16_384;

/// Columns per level-1 half.
const HALF_BITS: u16 = COLUMN_DOMAIN / 2;

/// Columns per level-2 band.
const BAND_BITS: u16 = 1_024;

/// First column of each band within a half.
const BAND_BASES: [u16; 8] = [0, 1024, 2048, 3072, 4096, 5120, 6144, 7168];

/// Bytes in one leaf bitmap (1024 bits).
const LEAF_BYTES: usize = 128;

/// Occupancy bitmap of one output row across the full column domain.
#[derive(Debug, Default)]
pub struct RowUsage {
    lower: Option<Box<Half>>,
    upper: Option<Box<Half>>,
}

#[derive(Debug, Default)]
struct Half {
    bands: [Band; 8],
}

/// One 1024-column band of a half.
///
/// `Full` stands in for the shared immutable all-ones leaf: it carries no
/// storage and is never written through, so a mark that lands on it is a
/// conflict by construction.
#[derive(Debug, Default)]
enum Band {
    #[default]
    Untouched,
    Full,
    Owned(Box<Leaf>),
}

#[derive(Debug)]
struct Leaf {
    bits: [u8; LEAF_BYTES],
}

impl RowUsage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the closed column interval `[left, right]` if every column in it
    /// is currently free; report a conflict otherwise.
    ///
    /// Both bounds are 0-based and must satisfy
    /// `left <= right < COLUMN_DOMAIN`.
    ///
    /// When the interval spans both halves or several bands, every covered
    /// sub-interval is evaluated and the results are combined with logical
    /// AND rather than short-circuiting, so a failing call may leave some
    /// sub-intervals marked. Callers abort the enclosing write on conflict,
    /// which keeps the partial mark unobservable through the window API.
    #[must_use]
    pub fn try_mark(&mut self, left: u16, right: u16) -> bool {
        debug_assert!(left <= right && right < COLUMN_DOMAIN);
        let mut ok = true;
        if left < HALF_BITS {
            let hi = right.min(HALF_BITS - 1);
            ok &= self
                .lower
                .get_or_insert_with(Box::default)
                .try_mark(left, hi);
        }
        if right >= HALF_BITS {
            let lo = left.max(HALF_BITS);
            ok &= self
                .upper
                .get_or_insert_with(Box::default)
                .try_mark(lo - HALF_BITS, right - HALF_BITS);
        }
        ok
    }

    /// Whether a single column is already marked.
    #[must_use]
    pub fn is_marked(&self, col: u16) -> bool {
        debug_assert!(col < COLUMN_DOMAIN);
        let (half, rel) = if col < HALF_BITS {
            (self.lower.as_ref(), col)
        } else {
            (self.upper.as_ref(), col - HALF_BITS)
        };
        half.is_some_and(|h| h.is_marked(rel))
    }
}

impl Half {
    /// Mark `[left, right]` relative to this half.
    ///
    /// Evaluates every covered band and ANDs the outcomes (no short-circuit).
    fn try_mark(&mut self, left: u16, right: u16) -> bool {
        let mut ok = true;
        for (band, &base) in self.bands.iter_mut().zip(BAND_BASES.iter()) {
            let lo = left.max(base);
            let hi = right.min(base + BAND_BITS - 1);
            if lo > hi {
                continue;
            }
            ok &= band.try_mark(lo - base, hi - base);
        }
        ok
    }

    fn is_marked(&self, col: u16) -> bool {
        self.bands
            .iter()
            .zip(BAND_BASES.iter())
            .find(|(_, &base)| col >= base && col < base + BAND_BITS)
            .is_some_and(|(band, &base)| band.is_marked(col - base))
    }
}

impl Band {
    /// Mark `[from, to]` relative to this band.
    fn try_mark(&mut self, from: u16, to: u16) -> bool {
        let whole_band = from == 0 && to == BAND_BITS - 1;
        match self {
            Band::Untouched if whole_band => {
                // Exact cover: take the shared all-ones marker, skip the leaf.
                *self = Band::Full;
                true
            }
            Band::Untouched => {
                let mut leaf = Box::new(Leaf::zeroed());
                let marked = leaf.try_mark(from, to);
                debug_assert!(marked);
                *self = Band::Owned(leaf);
                marked
            }
            Band::Full => false,
            Band::Owned(leaf) => leaf.try_mark(from, to),
        }
    }

    fn is_marked(&self, col: u16) -> bool {
        match self {
            Band::Untouched => false,
            Band::Full => true,
            Band::Owned(leaf) => leaf.is_marked(col),
        }
    }
}

/// OR-masks for a bit run inside one byte, keyed by (first bit, last bit).
/// Entries with `last < first` are unused and stay zero.
const SEGMENT_MASKS: [[u8; 8]; 8] = build_segment_masks();

#[allow(clippy::indexing_slicing)]
const fn build_segment_masks() -> [[u8; 8]; 8] {
    let mut table = [[0u8; 8]; 8];
    let mut from = 0;
    while from < 8 {
        let mut to = from;
        while to < 8 {
            let mut mask = 0u8;
            let mut bit = from;
            while bit <= to {
                mask |= 1 << bit;
                bit += 1;
            }
            table[from][to] = mask;
            to += 1;
        }
        from += 1;
    }
    table
}

fn segment_mask(from: u16, to: u16) -> u8 {
    SEGMENT_MASKS
        .get(usize::from(from))
        .and_then(|row| row.get(usize::from(to)))
        .copied()
        .unwrap_or(0)
}

impl Leaf {
    fn zeroed() -> Self {
        Self {
            bits: [0u8; LEAF_BYTES],
        }
    }

    /// Mark bits `[from, to]` (0-based within the band, inclusive).
    ///
    /// Detection is early-exit on the first conflicting byte; the bitmap is
    /// only written once the whole interval has checked out free, so a single
    /// leaf never ends up partially marked by a failing call.
    fn try_mark(&mut self, from: u16, to: u16) -> bool {
        let first_byte = usize::from(from / 8);
        let last_byte = usize::from(to / 8);

        if first_byte == last_byte {
            let mask = segment_mask(from % 8, to % 8);
            let Some(byte) = self.bits.get_mut(first_byte) else {
                return false;
            };
            if *byte & mask != 0 {
                return false;
            }
            *byte |= mask;
            return true;
        }

        let head = segment_mask(from % 8, 7);
        let tail = segment_mask(0, to % 8);

        if self.bits.get(first_byte).is_some_and(|b| b & head != 0) {
            return false;
        }
        if self.bits.get(last_byte).is_some_and(|b| b & tail != 0) {
            return false;
        }
        for byte in self.bits.iter().take(last_byte).skip(first_byte + 1) {
            if *byte != 0 {
                return false;
            }
        }

        if let Some(byte) = self.bits.get_mut(first_byte) {
            *byte |= head;
        }
        for byte in self.bits.iter_mut().take(last_byte).skip(first_byte + 1) {
            *byte = 0xFF;
        }
        if let Some(byte) = self.bits.get_mut(last_byte) {
            *byte |= tail;
        }
        true
    }

    fn is_marked(&self, col: u16) -> bool {
        let mask = segment_mask(col % 8, col % 8);
        self.bits
            .get(usize::from(col / 8))
            .is_some_and(|b| b & mask != 0)
    }
}
