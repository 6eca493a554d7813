//! CSV ingest for batch prediction.
//!
//! This module turns a listing CSV into rows that can be fed to the
//! orchestrator while keeping every original cell for the output table.
//!
//! Design goals:
//! - **Pass-through**: unknown columns are kept as-is
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **No prediction logic here**

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{RawRecord, RawValue};
use crate::error::AppError;

/// A row-level error encountered during ingest or prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    pub message: String,
}

/// One data row, padded to the header width.
#[derive(Debug, Clone)]
pub struct ListingRow {
    pub line: usize,
    pub cells: StringRecord,
}

/// Ingest output: headers + rows + row errors.
#[derive(Debug, Clone)]
pub struct ListingTable {
    /// Header row exactly as read (used for output).
    pub headers: StringRecord,
    /// Header names normalized for field lookup.
    pub field_names: Vec<String>,
    pub rows: Vec<ListingRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl ListingTable {
    /// Raw record for one row: cells are trimmed, blank cells are null.
    pub fn raw_record(&self, row: &ListingRow) -> RawRecord {
        self.field_names
            .iter()
            .zip(row.cells.iter())
            .map(|(name, cell)| {
                let cell = cell.trim();
                let value = if cell.is_empty() {
                    RawValue::Null
                } else {
                    RawValue::Text(cell.to_string())
                };
                (name.clone(), value)
            })
            .collect()
    }
}

/// Read a listing CSV from disk.
pub fn read_listings(path: &Path) -> Result<ListingTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_listings_from(file)
}

/// Read a listing CSV from any reader.
pub fn read_listings_from<R: Read>(reader: R) -> Result<ListingTable, AppError> {
    // No reader-level trimming: cells are written back untouched and only
    // trimmed when looked up as fields.
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::new(2, "CSV has no header row."));
    }

    let field_names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        if record.len() > width {
            row_errors.push(RowError {
                line,
                message: format!("Row has {} fields but the header has {width}.", record.len()),
            });
            continue;
        }

        rows.push(ListingRow {
            line,
            cells: pad_record(record, width),
        });
    }

    Ok(ListingTable {
        headers,
        field_names,
        rows,
        row_errors,
        rows_read,
    })
}

fn pad_record(mut record: StringRecord, width: usize) -> StringRecord {
    while record.len() < width {
        record.push_field("");
    }
    record
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. Field names are case-sensitive, so only trim.
    name.trim_start_matches('\u{feff}').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fields;

    #[test]
    fn rows_become_raw_records_with_nulls_for_blank_cells() {
        let csv = "\u{feff}Price_in_Lakhs, BHK ,City,Listing_Id\n120.5,,Pune,L-1\n";
        let table = read_listings_from(csv.as_bytes()).unwrap();

        assert_eq!(table.field_names, vec!["Price_in_Lakhs", "BHK", "City", "Listing_Id"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].line, 2);

        let record = table.raw_record(&table.rows[0]);
        assert_eq!(record.get(fields::PRICE_IN_LAKHS), Some(&RawValue::Text("120.5".to_string())));
        assert_eq!(record.get(fields::BHK), None);
        assert_eq!(record.get("Listing_Id"), Some(&RawValue::Text("L-1".to_string())));
    }

    #[test]
    fn cells_are_kept_verbatim_and_trimmed_on_lookup() {
        let csv = "Notes,City,BHK\n\"  padded note  \", Pune ,  \n";
        let table = read_listings_from(csv.as_bytes()).unwrap();

        assert_eq!(&table.rows[0].cells[0], "  padded note  ");
        assert_eq!(&table.rows[0].cells[1], " Pune ");

        let record = table.raw_record(&table.rows[0]);
        assert_eq!(record.get(fields::CITY), Some(&RawValue::Text("Pune".to_string())));
        assert_eq!(record.get(fields::BHK), None);
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_rejected() {
        let csv = "A,B,C\n1\n1,2,3,4\n1,2,3\n";
        let table = read_listings_from(csv.as_bytes()).unwrap();

        assert_eq!(table.rows_read, 3);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells.len(), 3);
        assert_eq!(table.row_errors.len(), 1);
        assert_eq!(table.row_errors[0].line, 3);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = read_listings(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
