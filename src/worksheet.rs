//! Worksheet body emission.
//!
//! [`SheetSink`] is the append-only element sink the streaming window flushes
//! into: rows arrive in strictly ascending order, cells in ascending column
//! order within a row, and nothing ever seeks backward.
//! [`WorksheetWriter`] is the production implementation, emitting
//! `xl/worksheets/sheetN.xml` through quick-xml.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::content::CellValue;
use crate::error::Result;
use crate::location::{Location, Range};
use crate::styles::StyleId;

/// Append-only sink for one sheet's body.
pub trait SheetSink {
    /// Open row `y` (1-based). Rows arrive in ascending order.
    ///
    /// # Errors
    /// Propagates sink I/O failures.
    fn begin_row(&mut self, y: i32) -> Result<()>;

    /// Write one cell of the open row. `value == None` is a styled or
    /// merge-anchored cell without content.
    ///
    /// # Errors
    /// Propagates sink I/O failures.
    fn cell(&mut self, at: Location, value: Option<&CellValue>, style: Option<StyleId>)
        -> Result<()>;

    /// Close the open row.
    ///
    /// # Errors
    /// Propagates sink I/O failures.
    fn end_row(&mut self) -> Result<()>;

    /// Write the sheet epilogue, including the collected merge rectangles.
    ///
    /// # Errors
    /// Propagates sink I/O failures.
    fn finish(&mut self, merges: &[Range]) -> Result<()>;
}

/// Streams one worksheet part as XML.
pub struct WorksheetWriter<W: Write> {
    xml: Writer<W>,
}

impl<W: Write> WorksheetWriter<W> {
    /// Write the worksheet prologue and leave `<sheetData>` open.
    ///
    /// # Errors
    /// Propagates XML/IO failures.
    pub fn new(writer: W) -> Result<Self> {
        let mut xml = Writer::new(writer);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        let mut root = BytesStart::new("worksheet");
        root.push_attribute((
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        ));
        root.push_attribute((
            "xmlns:r",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        ));
        xml.write_event(Event::Start(root))?;
        xml.write_event(Event::Start(BytesStart::new("sheetData")))?;
        Ok(Self { xml })
    }

    /// Hand back the underlying writer after `finish`.
    pub fn into_inner(self) -> W {
        self.xml.into_inner()
    }
}

impl<W: Write> SheetSink for WorksheetWriter<W> {
    fn begin_row(&mut self, y: i32) -> Result<()> {
        let mut row = BytesStart::new("row");
        row.push_attribute(("r", y.to_string().as_str()));
        self.xml.write_event(Event::Start(row))?;
        Ok(())
    }

    fn cell(
        &mut self,
        at: Location,
        value: Option<&CellValue>,
        style: Option<StyleId>,
    ) -> Result<()> {
        let reference = at.to_string();
        let mut c = BytesStart::new("c");
        c.push_attribute(("r", reference.as_str()));
        if let Some(s) = style {
            c.push_attribute(("s", s.to_string().as_str()));
        }

        let Some(value) = value else {
            // Reserved/styled cell with no content.
            self.xml.write_event(Event::Empty(c))?;
            return Ok(());
        };

        match value {
            CellValue::Number(n) => {
                self.xml.write_event(Event::Start(c))?;
                self.text_element("v", &n.to_string())?;
            }
            CellValue::Bool(b) => {
                c.push_attribute(("t", "b"));
                self.xml.write_event(Event::Start(c))?;
                self.text_element("v", if *b { "1" } else { "0" })?;
            }
            CellValue::Shared(id) => {
                c.push_attribute(("t", "s"));
                self.xml.write_event(Event::Start(c))?;
                self.text_element("v", &id.to_string())?;
            }
            CellValue::Inline(s) => {
                c.push_attribute(("t", "inlineStr"));
                self.xml.write_event(Event::Start(c))?;
                self.xml.write_event(Event::Start(BytesStart::new("is")))?;
                let mut t = BytesStart::new("t");
                if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                    t.push_attribute(("xml:space", "preserve"));
                }
                self.xml.write_event(Event::Start(t))?;
                self.xml.write_event(Event::Text(BytesText::new(s)))?;
                self.xml.write_event(Event::End(BytesEnd::new("t")))?;
                self.xml.write_event(Event::End(BytesEnd::new("is")))?;
            }
            CellValue::Formula { expr, cached } => {
                self.xml.write_event(Event::Start(c))?;
                let body = expr.strip_prefix('=').unwrap_or(expr);
                self.text_element("f", body)?;
                if let Some(n) = cached {
                    self.text_element("v", &n.to_string())?;
                }
            }
        }

        self.xml.write_event(Event::End(BytesEnd::new("c")))?;
        Ok(())
    }

    fn end_row(&mut self) -> Result<()> {
        self.xml.write_event(Event::End(BytesEnd::new("row")))?;
        Ok(())
    }

    fn finish(&mut self, merges: &[Range]) -> Result<()> {
        self.xml
            .write_event(Event::End(BytesEnd::new("sheetData")))?;
        if !merges.is_empty() {
            let mut start = BytesStart::new("mergeCells");
            start.push_attribute(("count", merges.len().to_string().as_str()));
            self.xml.write_event(Event::Start(start))?;
            for block in merges {
                let mut merge = BytesStart::new("mergeCell");
                merge.push_attribute(("ref", block.to_string().as_str()));
                self.xml.write_event(Event::Empty(merge))?;
            }
            self.xml
                .write_event(Event::End(BytesEnd::new("mergeCells")))?;
        }
        self.xml
            .write_event(Event::End(BytesEnd::new("worksheet")))?;
        Ok(())
    }
}

impl<W: Write> WorksheetWriter<W> {
    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.xml.write_event(Event::Start(BytesStart::new(name)))?;
        self.xml.write_event(Event::Text(BytesText::new(text)))?;
        self.xml.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}
