//! Composable layout units.
//!
//! A unit is a plain data holder that, given a window, writes content within
//! the current viewport and reports the bounding size it used. Compositors
//! never talk to each other: all composition goes through the shared window,
//! narrowing it with [`reduced`] for each child and restoring it afterwards.

use crate::content::CellValue;
use crate::error::Result;
use crate::location::Size;
use crate::styles::StyleId;
use crate::window::{reduced, Reduction, SheetWindow};

/// A composable layout node.
pub trait Unit {
    /// Write into the window's current viewport; report the bounding size
    /// used. Implementations must stay inside the viewport and balance every
    /// reduction they open.
    ///
    /// # Errors
    /// Propagates window protocol, conflict and sink errors.
    fn write(&self, window: &mut dyn SheetWindow) -> Result<Size>;
}

/// A single 1×1 cell.
#[derive(Debug)]
pub struct Cell {
    value: CellValue,
    style: Option<StyleId>,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            style: None,
        }
    }

    pub fn styled(value: impl Into<CellValue>, style: StyleId) -> Self {
        Self {
            value: value.into(),
            style: Some(style),
        }
    }
}

impl Unit for Cell {
    fn write(&self, window: &mut dyn SheetWindow) -> Result<Size> {
        window.place(self.value.clone(), self.style)?;
        Ok(Size::CELL)
    }
}

/// A merged block anchored at the viewport's top-left corner.
#[derive(Debug)]
pub struct Merged {
    size: Size,
    value: Option<CellValue>,
    style: Option<StyleId>,
}

impl Merged {
    pub fn new(size: Size, value: impl Into<CellValue>) -> Self {
        Self {
            size,
            value: Some(value.into()),
            style: None,
        }
    }

    pub fn styled(size: Size, value: impl Into<CellValue>, style: StyleId) -> Self {
        Self {
            size,
            value: Some(value.into()),
            style: Some(style),
        }
    }

    /// A reserved block with no content, e.g. padding under a header.
    #[must_use]
    pub fn empty(size: Size) -> Self {
        Self {
            size,
            value: None,
            style: None,
        }
    }
}

impl Unit for Merged {
    fn write(&self, window: &mut dyn SheetWindow) -> Result<Size> {
        window.merge(self.size, self.value.clone(), self.style)?;
        Ok(self.size)
    }
}

/// Claims space without writing anything; the cells stay blank.
#[derive(Debug)]
pub struct Gap {
    size: Size,
}

impl Gap {
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self { size }
    }
}

impl Unit for Gap {
    fn write(&self, _window: &mut dyn SheetWindow) -> Result<Size> {
        Ok(self.size)
    }
}

/// A blank span of whole rows; tells the window the rows were consumed so
/// the flush watermark advances past them.
#[derive(Debug)]
pub struct BlankRows {
    count: i32,
}

impl BlankRows {
    #[must_use]
    pub fn new(count: i32) -> Self {
        Self { count }
    }
}

impl Unit for BlankRows {
    fn write(&self, window: &mut dyn SheetWindow) -> Result<Size> {
        window.touch_rows(self.count)?;
        Ok(Size::new(0, self.count))
    }
}

/// Children written left-to-right; height is the tallest child.
#[derive(Default)]
pub struct Row {
    children: Vec<Box<dyn Unit>>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn push(mut self, unit: impl Unit + 'static) -> Self {
        self.children.push(Box::new(unit));
        self
    }
}

impl Unit for Row {
    fn write(&self, window: &mut dyn SheetWindow) -> Result<Size> {
        let mut used_width = 0;
        let mut height = 0;
        for child in &self.children {
            let size = reduced(window, Reduction::shift(used_width, 0)?, |w| {
                child.write(w)
            })?;
            used_width += size.width;
            height = height.max(size.height);
        }
        Ok(Size::new(used_width, height))
    }
}

/// Children written top-to-bottom; width is the widest child.
#[derive(Default)]
pub struct Column {
    children: Vec<Box<dyn Unit>>,
}

impl Column {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn push(mut self, unit: impl Unit + 'static) -> Self {
        self.children.push(Box::new(unit));
        self
    }
}

impl Unit for Column {
    fn write(&self, window: &mut dyn SheetWindow) -> Result<Size> {
        let mut used_height = 0;
        let mut width = 0;
        for child in &self.children {
            let size = reduced(window, Reduction::shift(0, used_height)?, |w| {
                child.write(w)
            })?;
            used_height += size.height;
            width = width.max(size.width);
        }
        Ok(Size::new(width, used_height))
    }
}

/// Pins an explicit viewport size for its child and claims that full size
/// regardless of how much of it the child used.
pub struct Bounded {
    size: Size,
    child: Box<dyn Unit>,
}

impl Bounded {
    pub fn new(size: Size, child: impl Unit + 'static) -> Self {
        Self {
            size,
            child: Box::new(child),
        }
    }
}

impl Unit for Bounded {
    fn write(&self, window: &mut dyn SheetWindow) -> Result<Size> {
        reduced(window, Reduction::shift_sized(0, 0, self.size)?, |w| {
            self.child.write(w)
        })?;
        Ok(self.size)
    }
}

/// A uniform row-major grid of plain values.
#[derive(Debug)]
pub struct Matrix {
    rows: Vec<Vec<CellValue>>,
    style: Option<StyleId>,
}

impl Matrix {
    #[must_use]
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows, style: None }
    }

    #[must_use]
    pub fn styled(rows: Vec<Vec<CellValue>>, style: StyleId) -> Self {
        Self {
            rows,
            style: Some(style),
        }
    }
}

impl Unit for Matrix {
    fn write(&self, window: &mut dyn SheetWindow) -> Result<Size> {
        let mut width = 0;
        let mut dy = 0;
        for row in &self.rows {
            let mut dx = 0;
            for value in row {
                reduced(window, Reduction::shift(dx, dy)?, |w| {
                    w.place(value.clone(), self.style)?;
                    Ok(())
                })?;
                dx += 1;
            }
            width = width.max(dx);
            dy += 1;
        }
        Ok(Size::new(width, dy))
    }
}

/// Header row plus body grid; the representative compositor combining
/// placement, styling and per-row reduction.
#[derive(Debug)]
pub struct Table {
    header: Vec<CellValue>,
    header_style: Option<StyleId>,
    body: Vec<Vec<CellValue>>,
    body_style: Option<StyleId>,
}

impl Table {
    #[must_use]
    pub fn new(header: Vec<CellValue>, body: Vec<Vec<CellValue>>) -> Self {
        Self {
            header,
            header_style: None,
            body,
            body_style: None,
        }
    }

    #[must_use]
    pub fn with_styles(
        mut self,
        header_style: Option<StyleId>,
        body_style: Option<StyleId>,
    ) -> Self {
        self.header_style = header_style;
        self.body_style = body_style;
        self
    }
}

impl Unit for Table {
    fn write(&self, window: &mut dyn SheetWindow) -> Result<Size> {
        let mut width = 0;
        let mut dx = 0;
        for value in &self.header {
            reduced(window, Reduction::shift(dx, 0)?, |w| {
                w.place(value.clone(), self.header_style)?;
                Ok(())
            })?;
            dx += 1;
        }
        width = width.max(dx);

        let mut dy = 1;
        for row in &self.body {
            let mut dx = 0;
            for value in row {
                reduced(window, Reduction::shift(dx, dy)?, |w| {
                    w.place(value.clone(), self.body_style)?;
                    Ok(())
                })?;
                dx += 1;
            }
            width = width.max(dx);
            dy += 1;
        }
        Ok(Size::new(width, dy))
    }
}
