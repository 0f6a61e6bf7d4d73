// src/export/spreadsheet.rs
// Excel (.xlsx) output: one worksheet, bold frozen header row, one row per bookmark.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use super::{header, row, ExportError};
use crate::bookmarks::FlatRecord;

const SHEET_NAME: &str = "Bookmarks";

pub(super) fn write_spreadsheet(
    records: &[FlatRecord],
    path: &Path,
    with_status: bool,
) -> Result<(), ExportError> {
    build_workbook(records, with_status)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|source| ExportError::Spreadsheet {
            path: path.to_path_buf(),
            source,
        })
}

fn build_workbook(records: &[FlatRecord], with_status: bool) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in header(with_status).iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row_number = (index + 1) as u32;
        for (col, value) in row(record, with_status).into_iter().enumerate() {
            // Leave empty cells blank
            if !value.is_empty() {
                sheet.write_string(row_number, col as u16, value)?;
            }
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    sheet.autofit();

    Ok(workbook)
}
