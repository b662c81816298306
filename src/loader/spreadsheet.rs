//! Spreadsheet rosters (xlsx, xls, ods), read from the first worksheet.

use std::io::{Cursor, Read, Seek};

use calamine::{Data, Ods, Range, Reader, Xls, Xlsx};

use super::{HeaderPolicy, LoadedRoster, RosterError, RowCollector};

/// Workbook container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workbook {
    /// Excel 2007+ (`.xlsx`, `.xlsm`).
    Xlsx,
    /// Legacy Excel (`.xls`).
    Xls,
    /// OpenDocument (`.ods`).
    Ods,
}

/// Largest float that still renders exactly as an integer.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Text of a cell as it should appear in the roster.
///
/// Numeric barcodes are usually stored as floats; whole numbers render
/// without a trailing `.0`.
#[must_use]
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT => {
            Some(format!("{}", *f as i64))
        }
        other => Some(other.to_string()),
    }
}

fn first_sheet<R, RS>(mut workbook: R) -> Result<Range<Data>, RosterError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    calamine::Error: From<R::Error>,
{
    match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => Ok(range),
        Some(Err(e)) => Err(RosterError::Spreadsheet(e.into())),
        None => Err(RosterError::NoWorksheet),
    }
}

fn open<R>(bytes: Vec<u8>) -> Result<Range<Data>, RosterError>
where
    R: Reader<Cursor<Vec<u8>>>,
    calamine::Error: From<R::Error>,
{
    let workbook = R::new(Cursor::new(bytes)).map_err(|e| RosterError::Spreadsheet(e.into()))?;
    first_sheet(workbook)
}

/// Read the first column of the first worksheet.
///
/// # Errors
///
/// Returns [`RosterError::Spreadsheet`] for unreadable workbooks,
/// [`RosterError::NoWorksheet`] when there is no sheet, and
/// [`RosterError::Empty`] if no barcode remains.
pub fn read_first_column(
    bytes: Vec<u8>,
    workbook: Workbook,
    header: HeaderPolicy,
) -> Result<LoadedRoster, RosterError> {
    let range = match workbook {
        Workbook::Xlsx => open::<Xlsx<_>>(bytes)?,
        Workbook::Xls => open::<Xls<_>>(bytes)?,
        Workbook::Ods => open::<Ods<_>>(bytes)?,
    };
    log::debug!("Worksheet range {:?}", range.get_size());

    let mut collector = RowCollector::new(header);
    for row in range.rows() {
        let text = row.first().and_then(cell_text);
        collector.push(text.as_deref());
    }
    collector.finish()
}
