//! xlwrite - streaming XLSX writer
//!
//! Places typed cell content into a (column, row) grid and streams it to the
//! output container incrementally, bounding memory to the currently open
//! rows instead of the whole sheet:
//! - Nested viewports: layout units recursively carve and occupy
//!   sub-rectangles of the grid through a stack-disciplined window
//! - Conflict detection: a hierarchical per-row bitmap guarantees no two
//!   writes collide
//! - Incremental flushing: buffered rows stream out in order while the
//!   watermark advances
//! - Book-level dedup for shared strings and styles
//!
//! # Usage
//!
//! ```no_run
//! use std::fs::File;
//! use xlwrite::{Cell, Column, Row, Unit, Workbook};
//!
//! # fn main() -> xlwrite::Result<()> {
//! let mut book = Workbook::new(File::create("report.xlsx")?);
//! let mut sheet = book.begin_sheet("Summary")?;
//! let title = sheet.context().text("Quarterly totals");
//! let header = Row::new().push(Cell::new(title)).push(Cell::new(42.0));
//! sheet.write_unit(&header)?;
//! sheet.finish()?;
//! book.finish()?;
//! # Ok(())
//! # }
//! ```

pub mod content;
pub mod error;
pub mod location;
pub mod row_usage;
pub mod shared_strings;
pub mod stream_window;
pub mod styles;
pub mod units;
pub mod window;
pub mod workbook;
pub mod worksheet;

pub use content::CellValue;
pub use error::{Result, XlwriteError};
pub use location::{column_letters, Location, Offset, Range, Size, MAX_COLUMN, MAX_ROW};
pub use row_usage::RowUsage;
pub use shared_strings::{SharedStringBudget, SharedStringId, SharedStrings};
pub use stream_window::StreamSheetWindow;
pub use styles::{BorderStyle, HAlign, Style, StyleId, Styles};
pub use units::{BlankRows, Bounded, Cell, Column, Gap, Matrix, Merged, Row, Table, Unit};
pub use window::{reduced, Reduction, ReductionScope, SheetWindow};
pub use workbook::{BookContext, SheetStream, Workbook};
pub use worksheet::{SheetSink, WorksheetWriter};

/// Get the library version
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
