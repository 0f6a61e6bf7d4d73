// src/export/mod.rs
// =============================================================================
// Writes flattened bookmarks to disk.
//
// Submodules:
// - delimited: CSV / TSV text files
// - spreadsheet: .xlsx workbooks
//
// Both formats share the same columns, in the same order:
//   Name, URL, Folder, Date Added[, Status]
// The Status column is only written when links were checked.
// =============================================================================

mod delimited;
mod spreadsheet;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::bookmarks::FlatRecord;

/// Column headers, Status last
const COLUMNS: [&str; 5] = ["Name", "URL", "Folder", "Date Added", "Status"];

/// The file formats we can write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Xlsx,
}

impl OutputFormat {
    /// Picks the format from the file extension (case-insensitive)
    ///
    /// Anything we don't recognise is written as CSV.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => OutputFormat::Csv,
            Some("tsv") | Some("tab") => OutputFormat::Tsv,
            Some("xlsx") => OutputFormat::Xlsx,
            other => {
                log::warn!(
                    "unrecognised output extension {:?}, writing CSV",
                    other.unwrap_or("")
                );
                OutputFormat::Csv
            }
        }
    }
}

/// Errors while writing the export file
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV to {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write spreadsheet {path}: {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

/// Writes `records` to `path` in the given format, keeping their order
pub fn export(
    records: &[FlatRecord],
    path: &Path,
    format: OutputFormat,
    with_status: bool,
) -> Result<(), ExportError> {
    log::debug!("writing {} record(s) to {} as {:?}", records.len(), path.display(), format);

    match format {
        OutputFormat::Csv => delimited::write_delimited(records, path, b',', with_status),
        OutputFormat::Tsv => delimited::write_delimited(records, path, b'\t', with_status),
        OutputFormat::Xlsx => spreadsheet::write_spreadsheet(records, path, with_status),
    }
}

// Header cells for the chosen columns
fn header(with_status: bool) -> &'static [&'static str] {
    if with_status {
        &COLUMNS
    } else {
        &COLUMNS[..4]
    }
}

// One record's cells, in header order
fn row(record: &FlatRecord, with_status: bool) -> Vec<String> {
    let mut cells = vec![
        record.name.clone(),
        record.url.clone(),
        record.folder(),
        record.date_added_display(),
    ];
    if with_status {
        cells.push(record.status.as_ref().map(ToString::to_string).unwrap_or_default());
    }
    cells
}
