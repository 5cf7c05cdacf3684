//! Typed cell payloads.
//!
//! The window and its buffers carry these values opaquely; only the sheet
//! sink looks inside when rendering a cell element. Text values are built
//! through [`crate::workbook::BookContext`], which decides between a shared
//! string reference and inline content based on the string table budget.

use crate::shared_strings::SharedStringId;

/// One cell's payload.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    /// Text written inline (`t="inlineStr"`), bypassing the string table.
    Inline(String),
    /// Reference into the book's shared string table (`t="s"`).
    Shared(SharedStringId),
    /// Formula with an optional cached numeric result.
    Formula {
        expr: String,
        cached: Option<f64>,
    },
}

impl CellValue {
    /// Formula without a cached result.
    #[must_use]
    pub fn formula(expr: impl Into<String>) -> Self {
        CellValue::Formula {
            expr: expr.into(),
            cached: None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Inline(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Inline(s)
    }
}
