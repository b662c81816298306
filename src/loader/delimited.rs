//! Delimited text rosters (CSV, TSV, plain text).

use std::io::Read;

use super::{HeaderPolicy, LoadedRoster, RosterError, RowCollector};

/// Pick tab when the first line contains one, otherwise comma.
#[must_use]
pub fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    if first_line.contains(&b'\t') {
        b'\t'
    } else {
        b','
    }
}

/// Read the first column of every row.
///
/// Rows may have differing field counts.
///
/// # Errors
///
/// Returns [`RosterError::Csv`] on malformed input (for example invalid
/// UTF-8) and [`RosterError::Empty`] if no barcode remains.
pub fn read_first_column<R: Read>(
    reader: R,
    delimiter: u8,
    header: HeaderPolicy,
) -> Result<LoadedRoster, RosterError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut collector = RowCollector::new(header);
    for record in csv_reader.records() {
        let record = record?;
        collector.push(record.get(0));
    }
    collector.finish()
}
