//! Exporters for scan history.
//!
//! This module provides different output formats:
//! - CSV for spreadsheets (`barcode,outcome,timestamp`)
//! - JSON for automation, with a progress summary
//!
//! Exporters are pure transformations over the records they are given.

pub mod csv;
pub mod json;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::validator::{Progress, ScanRecord};

// Re-export main types
pub use csv::CsvOutput;
pub use json::JsonOutput;

/// Export file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values
    #[default]
    Csv,
    /// JSON document with summary
    Json,
}

impl ExportFormat {
    /// File extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Default export file name, e.g. `scanned_barcodes_20240501_100000.csv`.
#[must_use]
pub fn default_export_name(now: DateTime<Local>, format: ExportFormat) -> PathBuf {
    PathBuf::from(format!(
        "scanned_barcodes_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

/// Write `records` in `format` to any writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_export<W: Write>(
    writer: &mut W,
    format: ExportFormat,
    records: &[ScanRecord],
    progress: Progress,
) -> Result<()> {
    match format {
        ExportFormat::Csv => CsvOutput::new(records)
            .write_to(writer)
            .context("Failed to write CSV export")?,
        ExportFormat::Json => JsonOutput::new(records, progress, Utc::now())
            .write_to(writer, true)
            .context("Failed to write JSON export")?,
    }
    Ok(())
}

/// Write `records` to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_to_file(
    path: &Path,
    format: ExportFormat,
    records: &[ScanRecord],
    progress: Progress,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_export(&mut writer, format, records, progress)?;
    writer
        .flush()
        .with_context(|| format!("Failed to write export to: {}", path.display()))?;
    log::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}
