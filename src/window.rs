//! The window/reduction protocol layout units write through.
//!
//! A window exposes one writable rectangle at a time: the top of a stack of
//! nested viewports. A layout unit narrows the viewport for its children by
//! pushing a [`Reduction`], writes, and restores the parent viewport by
//! releasing the returned [`ReductionScope`] — exactly once, in LIFO order.
//! The [`reduced`] helper packages that discipline so the pop happens on
//! error paths too.

use crate::content::CellValue;
use crate::error::{Result, XlwriteError};
use crate::location::{Offset, Range, Size};
use crate::styles::StyleId;

/// A request to narrow the current viewport: shift the top-left corner by a
/// non-negative offset and optionally pin an explicit new size.
#[derive(Debug, Clone, Copy)]
pub struct Reduction {
    offset: Offset,
    new_size: Option<Size>,
}

impl Reduction {
    /// # Errors
    /// Returns [`XlwriteError::InvalidArgument`] for a negative offset or a
    /// degenerate explicit size.
    pub fn new(offset: Offset, new_size: Option<Size>) -> Result<Self> {
        if offset.dx < 0 || offset.dy < 0 {
            return Err(XlwriteError::InvalidArgument(format!(
                "reduction offset must be non-negative, got ({},{})",
                offset.dx, offset.dy
            )));
        }
        if let Some(size) = new_size {
            if size.is_degenerate() {
                return Err(XlwriteError::InvalidArgument(format!(
                    "reduction size must not be degenerate, got {size}"
                )));
            }
        }
        Ok(Self { offset, new_size })
    }

    /// Shift only, keeping whatever of the parent extent remains.
    ///
    /// # Errors
    /// Returns [`XlwriteError::InvalidArgument`] for a negative offset.
    pub fn shift(dx: i32, dy: i32) -> Result<Self> {
        Self::new(Offset::new(dx, dy), None)
    }

    /// Shift and pin an explicit size.
    ///
    /// # Errors
    /// Returns [`XlwriteError::InvalidArgument`] for a negative offset or a
    /// degenerate size.
    pub fn shift_sized(dx: i32, dy: i32, size: Size) -> Result<Self> {
        Self::new(Offset::new(dx, dy), Some(size))
    }

    /// The child rectangle this reduction carves out of `current`.
    ///
    /// # Errors
    /// Returns [`XlwriteError::Protocol`] when the child is not contained in
    /// `current`.
    pub(crate) fn apply(&self, current: Range) -> Result<Range> {
        let child = Range::new(
            current.left_top + self.offset,
            self.new_size.unwrap_or(current.size - self.offset),
        );
        if child.size.is_degenerate() || !current.contains_range(&child) {
            return Err(XlwriteError::Protocol(format!(
                "reduction to {child} escapes the current viewport {current}"
            )));
        }
        Ok(child)
    }
}

/// Token returned by [`SheetWindow::reduce`]; releasing it through
/// [`SheetWindow::restore`] is the only way to pop the viewport stack.
///
/// The token records the stack depth captured at push time; a restore whose
/// token does not match the current depth is an out-of-LIFO release and
/// fails loudly. Double release is impossible: restore consumes the token.
#[derive(Debug)]
#[must_use = "a reduction scope must be restored, or the viewport stays narrowed"]
pub struct ReductionScope {
    depth: usize,
}

impl ReductionScope {
    pub(crate) fn at_depth(depth: usize) -> Self {
        Self { depth }
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }
}

/// The contract layout units write against.
///
/// Implementations own the viewport stack and the occupancy bookkeeping.
/// Callers must never write outside [`SheetWindow::range`] and must balance
/// every `reduce` with exactly one `restore` on every exit path.
pub trait SheetWindow {
    /// The currently writable rectangle: top of the reduction stack, or the
    /// window's remaining active range when the stack is empty.
    fn range(&self) -> Range;

    /// Push a narrowed viewport.
    ///
    /// # Errors
    /// [`XlwriteError::Protocol`] when the child rectangle escapes the
    /// current viewport or the window is no longer writable.
    fn reduce(&mut self, reduction: Reduction) -> Result<ReductionScope>;

    /// Pop the viewport pushed with `scope`.
    ///
    /// # Errors
    /// [`XlwriteError::Protocol`] when `scope` is not the most recent
    /// un-restored reduction.
    fn restore(&mut self, scope: ReductionScope) -> Result<()>;

    /// Write one cell at the viewport's top-left corner.
    ///
    /// # Errors
    /// [`XlwriteError::Protocol`] for an empty viewport;
    /// [`XlwriteError::Conflict`] when the cell is already occupied.
    fn place(&mut self, value: CellValue, style: Option<StyleId>) -> Result<()>;

    /// Merge a `size` block anchored at the viewport's top-left corner. The
    /// top-left cell carries `value`/`style`; the remaining covered cells are
    /// reserved so later writes into the block conflict.
    ///
    /// # Errors
    /// [`XlwriteError::Protocol`] when the block escapes the viewport;
    /// [`XlwriteError::Conflict`] when any covered cell is already occupied.
    fn merge(&mut self, size: Size, value: Option<CellValue>, style: Option<StyleId>)
        -> Result<()>;

    /// Declare a blank span of `count` rows consumed without cell content,
    /// so the flush watermark still advances past them.
    ///
    /// # Errors
    /// [`XlwriteError::InvalidArgument`] for a negative count.
    fn touch_rows(&mut self, count: i32) -> Result<()>;
}

/// Run `f` inside a reduced viewport, restoring the parent on every path.
///
/// When `f` fails, the reduction is still popped and `f`'s error wins over
/// any restore error.
///
/// # Errors
/// Propagates reduction, restore and `f` failures.
pub fn reduced<W, T, F>(window: &mut W, reduction: Reduction, f: F) -> Result<T>
where
    W: SheetWindow + ?Sized,
    F: FnOnce(&mut W) -> Result<T>,
{
    let scope = window.reduce(reduction)?;
    match f(window) {
        Ok(value) => {
            window.restore(scope)?;
            Ok(value)
        }
        Err(err) => {
            let _ = window.restore(scope);
            Err(err)
        }
    }
}
