//! Export batch predictions to CSV.
//!
//! The output is the input table (same header, same cells) with the
//! prediction columns appended, so it re-reads with the same tools.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::PredictionResult;
use crate::error::AppError;
use crate::predict::batch::{BatchOutput, PREDICTION_COLUMNS};

/// Write the prediction table to a CSV file.
pub fn write_predictions_csv(path: &Path, output: &BatchOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create output CSV '{}': {e}", path.display())))?;
    write_predictions(file, output)
}

/// Write the prediction table to any writer.
pub fn write_predictions<W: Write>(writer: W, output: &BatchOutput) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = output.headers.clone();
    for col in PREDICTION_COLUMNS {
        header.push_field(col);
    }
    wtr.write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write output CSV header: {e}")))?;

    for row in &output.rows {
        let mut record = row.cells.clone();
        for cell in prediction_cells(&row.result) {
            record.push_field(&cell);
        }
        wtr.write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write output CSV row {}: {e}", row.line)))?;
    }

    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush output CSV: {e}")))?;
    Ok(())
}

/// The four appended cells for one result; blank when a value is absent.
pub fn prediction_cells(result: &PredictionResult) -> [String; 4] {
    let num = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    [
        num(result.rf_price()),
        num(result.xgb_price()),
        result.investment_label().map(|l| l.to_string()).unwrap_or_default(),
        num(result.investment_probability()),
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::ModelError;
    use crate::io::ingest::read_listings_from;
    use crate::models::{FeatureRow, Model};
    use crate::predict::Orchestrator;
    use crate::predict::batch::{BatchOptions, predict_batch};
    use crate::registry::{ArtifactBundle, ScaleTable};

    struct Fixed(f64);

    impl Model for Fixed {
        fn predict(&self, _row: &FeatureRow) -> Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    #[test]
    fn appends_prediction_columns_and_keeps_input_cells() {
        let bundle = ArtifactBundle::empty()
            .with_rf(Arc::new(Fixed(300.0)))
            .with_classifier(Arc::new(Fixed(1.0)))
            .with_scales(ScaleTable::new(2.0, 1.0));
        let orchestrator = Orchestrator::new(Arc::new(bundle)).with_reference_year(2026);

        let input = "Listing_Id,Amenities\nL-1,\"Gym,Pool\"\nL-2,\n";
        let table = read_listings_from(input.as_bytes()).unwrap();
        let output = predict_batch(&orchestrator, table, BatchOptions::default()).unwrap();

        let mut buf = Vec::new();
        write_predictions(&mut buf, &output).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Listing_Id,Amenities,Future_Price_5Y_RF,Future_Price_5Y_XGB,Good_Investment_Label,Good_Investment_Prob"
        );
        assert_eq!(lines[1], "L-1,\"Gym,Pool\",150,,1,");
        assert_eq!(lines[2], "L-2,,150,,1,");

        // The output reads back with the same ingest code.
        let reread = read_listings_from(text.as_bytes()).unwrap();
        assert_eq!(reread.rows.len(), 2);
        assert_eq!(reread.field_names.len(), 6);
    }

    #[test]
    fn pass_through_cells_keep_their_padding() {
        let orchestrator = Orchestrator::new(Arc::new(ArtifactBundle::empty())).with_reference_year(2026);

        let input = "Notes,BHK\n\"  padded note  \",2\n";
        let table = read_listings_from(input.as_bytes()).unwrap();
        let output = predict_batch(&orchestrator, table, BatchOptions::default()).unwrap();

        let mut buf = Vec::new();
        write_predictions(&mut buf, &output).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].contains("  padded note  "));
        assert!(lines[1].ends_with(",2,,,,"));

        let reread = read_listings_from(text.as_bytes()).unwrap();
        assert_eq!(&reread.rows[0].cells[0], "  padded note  ");
    }
}
