// src/export/delimited.rs
// Delimited text output (CSV or TSV) via the `csv` crate, which handles quoting.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{header, row, ExportError};
use crate::bookmarks::FlatRecord;

// Lets spreadsheet applications detect UTF-8 (non-Latin bookmark titles)
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub(super) fn write_delimited(
    records: &[FlatRecord],
    path: &Path,
    delimiter: u8,
    with_status: bool,
) -> Result<(), ExportError> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_error = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut file = BufWriter::new(File::create(path).map_err(io_error)?);
    file.write_all(UTF8_BOM).map_err(io_error)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(file);

    writer.write_record(header(with_status)).map_err(csv_error)?;
    for record in records {
        writer.write_record(row(record, with_status)).map_err(csv_error)?;
    }
    writer.flush().map_err(io_error)
}
