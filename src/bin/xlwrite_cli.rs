//! Write a small demo workbook.
//!
//! Usage: `xlwrite_cli <output.xlsx>`

use std::env;
use std::fs::File;

use xlwrite::{
    Cell, CellValue, Column, HAlign, Merged, Row, Size, Style, Table, Workbook, XlwriteError,
};

fn main() -> xlwrite::Result<()> {
    let path = env::args().nth(1).ok_or_else(|| {
        XlwriteError::InvalidArgument("usage: xlwrite_cli <output.xlsx>".to_string())
    })?;

    let mut book = Workbook::new(File::create(path)?);

    let mut sheet = book.begin_sheet("Report")?;
    let header_style = sheet.context().style(Style {
        bold: true,
        align_h: Some(HAlign::Center),
        ..Style::default()
    });
    let title = sheet.context().text("Monthly totals");

    let layout = Column::new()
        .push(Merged::styled(Size::new(3, 1), title, header_style))
        .push(Table::new(
            vec![
                CellValue::from("Month"),
                CellValue::from("Units"),
                CellValue::from("Revenue"),
            ],
            vec![
                vec![CellValue::from("Jan"), 120.into(), 4800.0.into()],
                vec![CellValue::from("Feb"), 95.into(), 3810.5.into()],
                vec![CellValue::from("Mar"), 143.into(), 5720.0.into()],
            ],
        ))
        .push(
            Row::new()
                .push(Cell::new("Total"))
                .push(Cell::new(CellValue::formula("SUM(B3:B5)")))
                .push(Cell::new(CellValue::formula("SUM(C3:C5)"))),
        );
    sheet.write_unit(&layout)?;
    sheet.finish()?;

    book.finish()?;
    Ok(())
}
