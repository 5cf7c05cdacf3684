//! Shared test helpers: a recording sheet sink that captures everything the
//! streaming window emits, in emission order.

#![allow(dead_code)]

use xlwrite::{CellValue, Location, Range, Result, SheetSink, StyleId};

/// One captured cell write.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCell {
    pub reference: String,
    pub value: Option<CellValue>,
    pub style: Option<StyleId>,
}

/// One captured row in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRow {
    pub y: i32,
    pub cells: Vec<RecordedCell>,
}

/// Sink that records rows, cells and the epilogue instead of writing XML.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub rows: Vec<RecordedRow>,
    pub merges: Vec<String>,
    pub finished: bool,
    open_row: Option<RecordedRow>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row indices in the order they were emitted.
    pub fn row_order(&self) -> Vec<i32> {
        self.rows.iter().map(|r| r.y).collect()
    }

    /// Cell references of one emitted row, in emission order.
    pub fn cell_refs(&self, index: usize) -> Vec<String> {
        self.rows
            .get(index)
            .map(|r| r.cells.iter().map(|c| c.reference.clone()).collect())
            .unwrap_or_default()
    }
}

impl SheetSink for RecordingSink {
    fn begin_row(&mut self, y: i32) -> Result<()> {
        self.open_row = Some(RecordedRow {
            y,
            cells: Vec::new(),
        });
        Ok(())
    }

    fn cell(
        &mut self,
        at: Location,
        value: Option<&CellValue>,
        style: Option<StyleId>,
    ) -> Result<()> {
        if let Some(row) = self.open_row.as_mut() {
            row.cells.push(RecordedCell {
                reference: at.to_string(),
                value: value.cloned(),
                style,
            });
        }
        Ok(())
    }

    fn end_row(&mut self) -> Result<()> {
        if let Some(row) = self.open_row.take() {
            self.rows.push(row);
        }
        Ok(())
    }

    fn finish(&mut self, merges: &[Range]) -> Result<()> {
        self.merges = merges.iter().map(ToString::to_string).collect();
        self.finished = true;
        Ok(())
    }
}
