//! Workbook packaging: the ZIP container and the book-level registries.
//!
//! A [`Workbook`] owns the archive plus one [`BookContext`] (shared strings
//! and styles) that all sheets of the book share. Sheets are written one at
//! a time, each streaming its body straight into its archive entry; the
//! package epilogue (workbook part, registries, relationships, content
//! types) is written at [`Workbook::finish`].

use std::io::{Seek, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::content::CellValue;
use crate::error::{Result, XlwriteError};
use crate::location::Size;
use crate::shared_strings::{SharedStringBudget, SharedStrings};
use crate::stream_window::StreamSheetWindow;
use crate::styles::{Style, StyleId, Styles};
use crate::units::Unit;
use crate::worksheet::WorksheetWriter;

/// Book-level dedup registries, shared across all sheets of one book.
///
/// Owned by the workbook and passed by reference into each sheet stream;
/// single-threaded access is guaranteed by ownership.
#[derive(Debug, Default)]
pub struct BookContext {
    pub shared_strings: SharedStrings,
    pub styles: Styles,
}

impl BookContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_string_budget(budget: SharedStringBudget) -> Self {
        Self {
            shared_strings: SharedStrings::with_budget(budget),
            styles: Styles::new(),
        }
    }

    /// Text value: shared string reference when the table accepts it, inline
    /// content otherwise.
    pub fn text(&mut self, s: &str) -> CellValue {
        match self.shared_strings.try_register(s) {
            Some(id) => CellValue::Shared(id),
            None => CellValue::Inline(s.to_string()),
        }
    }

    /// Text value that always goes through the string table, ignoring
    /// budgets. For large strings repeated many times.
    pub fn text_forced(&mut self, s: &str) -> CellValue {
        CellValue::Shared(self.shared_strings.force_register(s))
    }

    /// Register a style and get its cell-level id.
    pub fn style(&mut self, style: Style) -> StyleId {
        self.styles.register(style)
    }
}

/// Streaming workbook writer over any `Write + Seek` target.
pub struct Workbook<W: Write + Seek> {
    zip: ZipWriter<W>,
    context: BookContext,
    sheet_names: Vec<String>,
    /// Sheets whose stream reached `finish`; a begun sheet that never did
    /// leaves its archive entry truncated, so the book must refuse to close.
    finished_sheets: usize,
}

impl<W: Write + Seek> Workbook<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            context: BookContext::new(),
            sheet_names: Vec::new(),
            finished_sheets: 0,
        }
    }

    #[must_use]
    pub fn with_context(writer: W, context: BookContext) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            context,
            sheet_names: Vec::new(),
            finished_sheets: 0,
        }
    }

    #[must_use]
    pub fn context(&self) -> &BookContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut BookContext {
        &mut self.context
    }

    /// Start streaming a new sheet. The previous sheet (if any) must have
    /// been finished first.
    ///
    /// # Errors
    /// [`XlwriteError::InvalidArgument`] for an empty or duplicate name;
    /// [`XlwriteError::Protocol`] when an earlier sheet's stream was dropped
    /// without `finish`; archive errors from the container.
    pub fn begin_sheet(&mut self, name: &str) -> Result<SheetStream<'_, W>> {
        if self.finished_sheets != self.sheet_names.len() {
            return Err(XlwriteError::Protocol(
                "previous sheet was dropped without finish".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(XlwriteError::InvalidArgument(
                "sheet name must not be empty".to_string(),
            ));
        }
        if self.sheet_names.iter().any(|n| n == name) {
            return Err(XlwriteError::InvalidArgument(format!(
                "duplicate sheet name: {name}"
            )));
        }
        self.sheet_names.push(name.to_string());

        let Self {
            zip,
            context,
            sheet_names,
            finished_sheets,
        } = self;
        zip.start_file(
            format!("xl/worksheets/sheet{}.xml", sheet_names.len()),
            deflated(),
        )?;
        let sink = WorksheetWriter::new(zip)?;
        let window = StreamSheetWindow::over_grid(sink)?;
        Ok(SheetStream {
            window,
            context,
            finished: finished_sheets,
        })
    }

    /// Write the package epilogue and finalize the archive, handing back the
    /// underlying writer.
    ///
    /// # Errors
    /// [`XlwriteError::InvalidArgument`] for a book with no sheets;
    /// [`XlwriteError::Protocol`] when a begun sheet never finished (its
    /// archive entry is truncated); archive and XML errors from the parts.
    pub fn finish(mut self) -> Result<W> {
        if self.sheet_names.is_empty() {
            return Err(XlwriteError::InvalidArgument(
                "workbook must contain at least one sheet".to_string(),
            ));
        }
        if self.finished_sheets != self.sheet_names.len() {
            return Err(XlwriteError::Protocol(format!(
                "{} of {} sheet(s) never finished",
                self.sheet_names.len() - self.finished_sheets,
                self.sheet_names.len()
            )));
        }

        self.zip.start_file("xl/workbook.xml", deflated())?;
        write_workbook_xml(&mut self.zip, &self.sheet_names)?;

        self.zip.start_file("xl/styles.xml", deflated())?;
        self.context.styles.write_xml(&mut self.zip)?;

        self.zip.start_file("xl/sharedStrings.xml", deflated())?;
        self.context.shared_strings.write_xml(&mut self.zip)?;

        self.zip
            .start_file("xl/_rels/workbook.xml.rels", deflated())?;
        let rels = workbook_rels(self.sheet_names.len());
        self.zip.write_all(rels.as_bytes())?;

        self.zip.start_file("_rels/.rels", deflated())?;
        self.zip.write_all(ROOT_RELS.as_bytes())?;

        self.zip.start_file("[Content_Types].xml", deflated())?;
        let types = content_types(self.sheet_names.len());
        self.zip.write_all(types.as_bytes())?;

        Ok(self.zip.finish()?)
    }
}

fn deflated() -> FileOptions {
    FileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// One sheet being streamed: the window over the sheet's archive entry plus
/// access to the book context for string/style registration.
pub struct SheetStream<'a, W: Write + Seek> {
    window: StreamSheetWindow<WorksheetWriter<&'a mut ZipWriter<W>>>,
    context: &'a mut BookContext,
    finished: &'a mut usize,
}

impl<'a, W: Write + Seek> SheetStream<'a, W> {
    pub fn window(&mut self) -> &mut StreamSheetWindow<WorksheetWriter<&'a mut ZipWriter<W>>> {
        &mut self.window
    }

    pub fn context(&mut self) -> &mut BookContext {
        self.context
    }

    /// Write a layout unit at the current viewport.
    ///
    /// # Errors
    /// Propagates the unit's window and sink errors.
    pub fn write_unit(&mut self, unit: &dyn Unit) -> Result<Size> {
        unit.write(&mut self.window)
    }

    /// Serialize buffered rows and advance the watermark.
    ///
    /// # Errors
    /// See [`StreamSheetWindow::flush`].
    pub fn flush(&mut self) -> Result<()> {
        self.window.flush()
    }

    /// Complete the sheet: final flush plus epilogue. A stream dropped
    /// without this call leaves the book unable to finish.
    ///
    /// # Errors
    /// See [`StreamSheetWindow::complete`].
    pub fn finish(self) -> Result<()> {
        self.window.complete()?;
        *self.finished += 1;
        Ok(())
    }
}

fn write_workbook_xml<W: Write>(writer: W, names: &[String]) -> Result<()> {
    let mut xml = Writer::new(writer);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    let mut root = BytesStart::new("workbook");
    root.push_attribute((
        "xmlns",
        "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
    ));
    root.push_attribute((
        "xmlns:r",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
    ));
    xml.write_event(Event::Start(root))?;
    xml.write_event(Event::Start(BytesStart::new("sheets")))?;
    for (i, name) in names.iter().enumerate() {
        let mut sheet = BytesStart::new("sheet");
        sheet.push_attribute(("name", name.as_str()));
        sheet.push_attribute(("sheetId", (i + 1).to_string().as_str()));
        sheet.push_attribute(("r:id", format!("rId{}", i + 1).as_str()));
        xml.write_event(Event::Empty(sheet))?;
    }
    xml.write_event(Event::End(BytesEnd::new("sheets")))?;
    xml.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(())
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

fn workbook_rels(sheet_count: usize) -> String {
    let mut out = String::with_capacity(512);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    out.push('\n');
    for i in 1..=sheet_count {
        out.push_str(&format!(
            "<Relationship Id=\"rId{i}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet{i}.xml\"/>\n",
        ));
    }
    out.push_str(&format!(
        "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>\n",
        sheet_count + 1
    ));
    out.push_str(&format!(
        "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings\" Target=\"sharedStrings.xml\"/>\n",
        sheet_count + 2
    ));
    out.push_str("</Relationships>");
    out
}

fn content_types(sheet_count: usize) -> String {
    let mut out = String::with_capacity(768);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    out.push('\n');
    out.push_str(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    out.push('\n');
    out.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    out.push('\n');
    out.push_str(
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    out.push('\n');
    for i in 1..=sheet_count {
        out.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{i}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>\n",
        ));
    }
    out.push_str(
        r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    );
    out.push('\n');
    out.push_str(
        r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    );
    out.push('\n');
    out.push_str("</Types>");
    out
}
