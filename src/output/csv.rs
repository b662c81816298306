//! CSV export of scan history.
//!
//! One row is generated per record, in the order the scans were recorded.
//!
//! # Columns
//!
//! - `barcode`: The code as scanned (trimmed)
//! - `outcome`: `valid`, `invalid` or `duplicate`
//! - `timestamp`: Capture time (RFC 3339, UTC)
//!
//! # Example
//!
//! ```
//! use chrono::DateTime;
//! use scancheck::output::csv::CsvOutput;
//! use scancheck::validator::{Outcome, ScanRecord};
//!
//! let records = vec![ScanRecord::new(
//!     "A1",
//!     DateTime::from_timestamp(0, 0).unwrap(),
//!     Outcome::Valid,
//! )];
//! let csv = CsvOutput::new(&records).to_string().unwrap();
//! assert_eq!(csv, "barcode,outcome,timestamp\nA1,valid,1970-01-01T00:00:00+00:00\n");
//! ```

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::validator::ScanRecord;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A single row in the CSV output.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    barcode: &'a str,
    outcome: &'static str,
    timestamp: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    records: &'a [ScanRecord],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(records: &'a [ScanRecord]) -> Self {
        Self { records }
    }

    /// Write the CSV output to the given writer.
    ///
    /// The header row is written even when there are no records.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        csv_writer.write_record(["barcode", "outcome", "timestamp"])?;
        for record in self.records {
            csv_writer.serialize(CsvRow {
                barcode: &record.barcode,
                outcome: record.outcome.as_str(),
                timestamp: record.timestamp.to_rfc3339(),
            })?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
