//! Buffered, flush-capable sheet window.
//!
//! `StreamSheetWindow` accepts `place`/`merge`/`reduce` calls while holding
//! only the rows not yet flushed; `flush` serializes the buffer to the sheet
//! sink in ascending row order and advances the watermark, shrinking the
//! active range so flushed rows can never be written again. Memory stays
//! proportional to in-flight content, not sheet size.

use std::collections::BTreeMap;

use crate::content::CellValue;
use crate::error::{Result, XlwriteError};
use crate::location::{Location, Range, Size, MAX_COLUMN, MAX_ROW};
use crate::row_usage::RowUsage;
use crate::styles::StyleId;
use crate::window::{Reduction, ReductionScope, SheetWindow};
use crate::worksheet::SheetSink;

/// One buffered cell: a merge filler keeps `value == None` so only the
/// block's top-left cell carries content.
#[derive(Debug)]
struct PendingCell {
    value: Option<CellValue>,
    style: Option<StyleId>,
}

/// One buffered row: occupancy bitmap plus cells keyed by column, so
/// iteration yields ascending column order for free.
#[derive(Debug, Default)]
struct PendingRow {
    usage: RowUsage,
    cells: BTreeMap<i32, PendingCell>,
}

/// A sink write failed mid-row; the window must not be reused.
#[derive(Debug, PartialEq, Eq)]
enum State {
    Building,
    Poisoned,
}

/// Concrete [`SheetWindow`] that streams buffered rows to a [`SheetSink`].
///
/// Completion is by value: [`StreamSheetWindow::complete`] consumes the
/// window, so "mutation after complete" is unrepresentable.
#[derive(Debug)]
pub struct StreamSheetWindow<S: SheetSink> {
    sink: S,
    /// Remaining unflushed portion of the grid; only ever shrinks downward.
    active: Range,
    stack: Vec<Range>,
    rows: BTreeMap<i32, PendingRow>,
    merges: Vec<Range>,
    /// Blank rows declared via `touch_rows` since the last flush.
    touched: i32,
    state: State,
}

impl<S: SheetSink> StreamSheetWindow<S> {
    /// Open a window over `range`.
    ///
    /// # Errors
    /// [`XlwriteError::InvalidArgument`] when `range` is empty, degenerate or
    /// escapes the grid domain.
    pub fn new(sink: S, range: Range) -> Result<Self> {
        let grid = Range::new(
            Location::new(1, 1),
            Size::new(MAX_COLUMN, MAX_ROW),
        );
        if range.is_empty() || range.size.is_degenerate() || !grid.contains_range(&range) {
            return Err(XlwriteError::InvalidArgument(format!(
                "window range {range} is not a non-empty sub-rectangle of the grid"
            )));
        }
        Ok(Self {
            sink,
            active: range,
            stack: Vec::new(),
            rows: BTreeMap::new(),
            merges: Vec::new(),
            touched: 0,
            state: State::Building,
        })
    }

    /// Open a window over the whole grid.
    ///
    /// # Errors
    /// Never fails in practice; shares [`StreamSheetWindow::new`]'s contract.
    pub fn over_grid(sink: S) -> Result<Self> {
        Self::new(
            sink,
            Range::new(Location::new(1, 1), Size::new(MAX_COLUMN, MAX_ROW)),
        )
    }

    /// The remaining unflushed range.
    #[must_use]
    pub fn active_range(&self) -> Range {
        self.active
    }

    fn ensure_building(&self) -> Result<()> {
        if self.state == State::Poisoned {
            return Err(XlwriteError::Protocol(
                "window poisoned by an earlier sink failure".to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize all buffered rows, advance the watermark past them (or past
    /// the rows declared blank via `touch_rows`, whichever is lower) and
    /// release the buffer.
    ///
    /// # Errors
    /// [`XlwriteError::Protocol`] when reductions are still open; sink errors
    /// poison the window.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_building()?;
        if !self.stack.is_empty() {
            return Err(XlwriteError::Protocol(format!(
                "flush with {} unbalanced reduction(s)",
                self.stack.len()
            )));
        }

        if let Err(err) = self.emit_rows() {
            self.state = State::Poisoned;
            return Err(err);
        }

        let mut next_top = self.active.left_top.y + self.touched;
        if let Some((&last, _)) = self.rows.last_key_value() {
            next_top = next_top.max(last + 1);
        }
        let bottom = self.active.bottom();
        let next_top = next_top.min(bottom + 1);
        self.active = Range::new(
            Location::new(self.active.left_top.x, next_top),
            Size::new(self.active.size.width, bottom - next_top + 1),
        );
        self.rows.clear();
        self.touched = 0;
        Ok(())
    }

    fn emit_rows(&mut self) -> Result<()> {
        let Self { sink, rows, .. } = self;
        for (&y, row) in rows.iter() {
            sink.begin_row(y)?;
            for (&x, cell) in &row.cells {
                sink.cell(Location::new(x, y), cell.value.as_ref(), cell.style)?;
            }
            sink.end_row()?;
        }
        Ok(())
    }

    /// Final flush plus sheet epilogue (merged ranges). Consumes the window
    /// and hands the sink back.
    ///
    /// # Errors
    /// Same as [`StreamSheetWindow::flush`], plus sink epilogue failures.
    pub fn complete(mut self) -> Result<S> {
        self.flush()?;
        self.sink.finish(&self.merges)?;
        Ok(self.sink)
    }

    fn row_mut(&mut self, y: i32) -> &mut PendingRow {
        self.rows.entry(y).or_default()
    }
}

/// 1-based grid column to 0-based bitmap index.
fn col_index(x: i32) -> Result<u16> {
    u16::try_from(x - 1)
        .map_err(|_| XlwriteError::InvalidArgument(format!("column {x} outside the grid")))
}

impl<S: SheetSink> SheetWindow for StreamSheetWindow<S> {
    fn range(&self) -> Range {
        self.stack.last().copied().unwrap_or(self.active)
    }

    fn reduce(&mut self, reduction: Reduction) -> Result<ReductionScope> {
        self.ensure_building()?;
        let child = reduction.apply(self.range())?;
        self.stack.push(child);
        Ok(ReductionScope::at_depth(self.stack.len()))
    }

    fn restore(&mut self, scope: ReductionScope) -> Result<()> {
        if scope.depth() != self.stack.len() {
            return Err(XlwriteError::Protocol(format!(
                "reduction released out of order: scope depth {}, stack depth {}",
                scope.depth(),
                self.stack.len()
            )));
        }
        self.stack.pop();
        Ok(())
    }

    fn place(&mut self, value: CellValue, style: Option<StyleId>) -> Result<()> {
        self.ensure_building()?;
        let viewport = self.range();
        if viewport.is_empty() {
            return Err(XlwriteError::Protocol(
                "place into an empty viewport".to_string(),
            ));
        }
        let at = viewport.left_top;
        let col = col_index(at.x)?;
        let row = self.row_mut(at.y);
        if !row.usage.try_mark(col, col) {
            return Err(XlwriteError::Conflict(at.to_string()));
        }
        row.cells.insert(
            at.x,
            PendingCell {
                value: Some(value),
                style,
            },
        );
        Ok(())
    }

    fn merge(
        &mut self,
        size: Size,
        value: Option<CellValue>,
        style: Option<StyleId>,
    ) -> Result<()> {
        self.ensure_building()?;
        if size.is_degenerate() || size.is_empty() {
            return Err(XlwriteError::InvalidArgument(format!(
                "merge size must cover at least one cell, got {size}"
            )));
        }
        let viewport = self.range();
        if viewport.is_empty() {
            return Err(XlwriteError::Protocol(
                "merge into an empty viewport".to_string(),
            ));
        }
        let block = Range::new(viewport.left_top, size);
        if !viewport.contains_range(&block) {
            return Err(XlwriteError::Protocol(format!(
                "merge block {block} escapes the viewport {viewport}"
            )));
        }
        let left = col_index(block.left_top.x)?;
        let right = col_index(block.right())?;
        for y in block.left_top.y..=block.bottom() {
            if !self.row_mut(y).usage.try_mark(left, right) {
                return Err(XlwriteError::Conflict(block.to_string()));
            }
        }
        let anchor = block.left_top;
        self.row_mut(anchor.y).cells.insert(
            anchor.x,
            PendingCell { value, style },
        );
        if size.width > 1 || size.height > 1 {
            self.merges.push(block);
        }
        Ok(())
    }

    fn touch_rows(&mut self, count: i32) -> Result<()> {
        self.ensure_building()?;
        if count < 0 {
            return Err(XlwriteError::InvalidArgument(format!(
                "touched row count must be non-negative, got {count}"
            )));
        }
        self.touched += count;
        Ok(())
    }
}
