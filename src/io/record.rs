//! Read/write single-record JSON files.
//!
//! A record file is a flat JSON object of raw listing fields, e.g.
//! `{"Price_in_Lakhs": 120, "City": "Pune", "BHK": null}`.
//! A result file is the serialized `PredictionResult`.

use std::fs::File;
use std::path::Path;

use crate::domain::{PredictionResult, RawRecord};
use crate::error::AppError;

/// Read a raw record JSON file.
pub fn read_record_json(path: &Path) -> Result<RawRecord, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open record JSON '{}': {e}", path.display())))?;
    let record: RawRecord =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid record JSON: {e}")))?;
    Ok(record)
}

/// Write a prediction result JSON file.
pub fn write_result_json(path: &Path, result: &PredictionResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;
    Ok(())
}
