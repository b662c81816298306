//! JSON export of scan history.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "exported_at": "2024-05-01T10:00:00Z",
//!   "summary": {
//!     "valid": 2,
//!     "invalid": 1,
//!     "duplicate": 1,
//!     "roster_size": 2,
//!     "scanned": 2,
//!     "remaining": 0,
//!     "completion_percent": 100.0
//!   },
//!   "records": [
//!     { "barcode": "A1", "outcome": "valid", "timestamp": "2024-05-01T09:59:00Z" }
//!   ]
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::validator::{Progress, ScanRecord};

/// Summary block of the JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Roster progress and outcome totals
    #[serde(flatten)]
    pub progress: Progress,
    /// Completion percentage of the roster
    pub completion_percent: f64,
}

impl JsonSummary {
    /// Build from a progress snapshot.
    #[must_use]
    pub fn from_progress(progress: Progress) -> Self {
        Self {
            progress,
            completion_percent: progress.completion_percent(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// When the export was produced
    pub exported_at: DateTime<Utc>,
    /// Progress summary
    pub summary: JsonSummary,
    /// History in chronological order
    pub records: &'a [ScanRecord],
}

impl<'a> JsonOutput<'a> {
    /// Create a new JSON output.
    #[must_use]
    pub fn new(records: &'a [ScanRecord], progress: Progress, exported_at: DateTime<Utc>) -> Self {
        Self {
            exported_at,
            summary: JsonSummary::from_progress(progress),
            records,
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            serde_json::to_string(self)?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
