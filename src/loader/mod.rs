//! Roster loading from uploaded tables.
//!
//! A roster file holds one barcode per row in its first column. Supported
//! formats:
//! - Delimited text: `.csv` (comma), `.tsv` / `.tab` (tab), `.txt` (sniffed)
//! - Spreadsheets: `.xlsx`, `.xlsm`, `.xls`, `.ods` (first worksheet)
//!
//! The first row may be a header. With [`HeaderPolicy::Auto`] it is skipped
//! when its first cell does not look like a barcode.
//!
//! # Example
//!
//! ```no_run
//! use scancheck::loader::{load_roster, LoadOptions};
//! use scancheck::validator::MatchPolicy;
//! use std::path::Path;
//!
//! let loaded = load_roster(Path::new("barcodes.csv"), &LoadOptions::default()).unwrap();
//! let roster = loaded.into_roster(MatchPolicy::exact());
//! println!("{} codes", roster.len());
//! ```

pub mod delimited;
pub mod spreadsheet;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validator::{MatchPolicy, Roster};

pub use spreadsheet::Workbook;

/// Errors that can occur while loading a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The file could not be read.
    #[error("Failed to read roster file {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The file extension is not a known table format.
    #[error("Unsupported roster format: {0} (expected csv, tsv, txt, xlsx, xls or ods)")]
    UnsupportedFormat(PathBuf),

    /// Delimited text could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The spreadsheet could not be parsed.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// The spreadsheet contains no worksheets.
    #[error("Spreadsheet has no worksheets")]
    NoWorksheet,

    /// No usable barcode was found.
    #[error("Roster is empty: no barcodes found in the first column")]
    Empty,
}

/// Whether the first row is treated as a header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    /// Skip the first row only if it does not look like a barcode
    #[default]
    Auto,
    /// Always skip the first row
    Always,
    /// Never skip the first row
    Never,
}

/// Table format of a roster file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    /// Delimited text with a known delimiter.
    Delimited(u8),
    /// Delimited text; tab if the first line contains one, else comma.
    Text,
    /// Spreadsheet workbook, first worksheet.
    Spreadsheet(Workbook),
}

impl RosterFormat {
    /// Determine the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnsupportedFormat`] for unknown extensions.
    pub fn from_path(path: &Path) -> Result<Self, RosterError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Delimited(b',')),
            "tsv" | "tab" => Ok(Self::Delimited(b'\t')),
            "txt" => Ok(Self::Text),
            "xlsx" | "xlsm" => Ok(Self::Spreadsheet(Workbook::Xlsx)),
            "xls" => Ok(Self::Spreadsheet(Workbook::Xls)),
            "ods" => Ok(Self::Spreadsheet(Workbook::Ods)),
            _ => Err(RosterError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Options for [`load_roster`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Header row handling.
    pub header: HeaderPolicy,
    /// Force a format instead of using the file extension.
    pub format: Option<RosterFormat>,
}

/// Barcodes read from a roster file, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedRoster {
    /// Trimmed first-column values in file order. May contain repeats.
    pub codes: Vec<String>,
    /// Rows read, including the header and blank rows.
    pub rows_read: usize,
    /// The skipped header cell, if any.
    pub header: Option<String>,
    /// Rows whose first cell was empty.
    pub blank_cells: usize,
}

impl LoadedRoster {
    /// Normalize into a [`Roster`].
    #[must_use]
    pub fn into_roster(self, policy: MatchPolicy) -> Roster {
        Roster::from_codes(self.codes, policy)
    }
}

/// Whether a cell looks like a barcode rather than a column title.
///
/// A barcode contains at least one ASCII digit and no whitespace.
#[must_use]
pub fn is_barcode_like(cell: &str) -> bool {
    let cell = cell.trim();
    !cell.is_empty()
        && cell.chars().any(|c| c.is_ascii_digit())
        && !cell.chars().any(char::is_whitespace)
}

/// Accumulates first-column cells row by row.
#[derive(Debug)]
pub(crate) struct RowCollector {
    policy: HeaderPolicy,
    loaded: LoadedRoster,
}

impl RowCollector {
    pub(crate) fn new(policy: HeaderPolicy) -> Self {
        Self {
            policy,
            loaded: LoadedRoster::default(),
        }
    }

    /// Feed the first cell of the next row (`None` for an empty row).
    pub(crate) fn push(&mut self, first_cell: Option<&str>) {
        let is_first_row = self.loaded.rows_read == 0;
        self.loaded.rows_read += 1;

        // Spreadsheet exports from Windows tools often carry a BOM
        let cell = first_cell
            .map(|c| c.trim_start_matches('\u{feff}').trim())
            .unwrap_or_default();

        if is_first_row {
            let skip = match self.policy {
                HeaderPolicy::Always => true,
                HeaderPolicy::Never => false,
                HeaderPolicy::Auto => !cell.is_empty() && !is_barcode_like(cell),
            };
            if skip {
                log::debug!("Skipping roster header row: {cell:?}");
                self.loaded.header = Some(cell.to_string());
                return;
            }
        }

        if cell.is_empty() {
            self.loaded.blank_cells += 1;
        } else {
            self.loaded.codes.push(cell.to_string());
        }
    }

    pub(crate) fn finish(self) -> Result<LoadedRoster, RosterError> {
        if self.loaded.codes.is_empty() {
            return Err(RosterError::Empty);
        }
        Ok(self.loaded)
    }
}

/// Load a roster file from disk.
///
/// # Errors
///
/// Returns [`RosterError`] if the file cannot be read or parsed, has an
/// unknown extension, or yields no barcodes.
pub fn load_roster(path: &Path, options: &LoadOptions) -> Result<LoadedRoster, RosterError> {
    let format = match options.format {
        Some(format) => format,
        None => RosterFormat::from_path(path)?,
    };
    let bytes = fs::read(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let loaded = load_roster_bytes(bytes, format, options.header)?;
    log::info!(
        "Loaded {} barcodes from {} ({} rows)",
        loaded.codes.len(),
        path.display(),
        loaded.rows_read
    );
    Ok(loaded)
}

/// Load a roster from uploaded bytes of a known format.
///
/// # Errors
///
/// Returns [`RosterError`] if the bytes cannot be parsed or yield no barcodes.
pub fn load_roster_bytes(
    bytes: Vec<u8>,
    format: RosterFormat,
    header: HeaderPolicy,
) -> Result<LoadedRoster, RosterError> {
    match format {
        RosterFormat::Delimited(delimiter) => {
            delimited::read_first_column(bytes.as_slice(), delimiter, header)
        }
        RosterFormat::Text => {
            let delimiter = delimited::sniff_delimiter(&bytes);
            delimited::read_first_column(bytes.as_slice(), delimiter, header)
        }
        RosterFormat::Spreadsheet(workbook) => {
            spreadsheet::read_first_column(bytes, workbook, header)
        }
    }
}
