//! Batch runner: the orchestrator over every row of a listing table.
//!
//! Output rows keep input order and every input cell. Rows whose numeric
//! fields cannot be coerced are handled by the configured `RowErrorPolicy`;
//! per-model failures stay inside each row's `PredictionResult`.

use csv::StringRecord;
use rayon::prelude::*;

use crate::domain::{PredictionResult, RawRecord};
use crate::error::{AppError, PipelineError};
use crate::io::ingest::{ListingRow, ListingTable, RowError};
use crate::predict::Orchestrator;

/// Columns appended to the input table, in order.
pub const PREDICTION_COLUMNS: [&str; 4] = [
    "Future_Price_5Y_RF",
    "Future_Price_5Y_XGB",
    "Good_Investment_Label",
    "Good_Investment_Prob",
];

/// What to do with a row that cannot be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowErrorPolicy {
    /// Leave the row out of the output and report it.
    #[default]
    Skip,
    /// Stop the whole batch at the first bad row.
    Abort,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub policy: RowErrorPolicy,
    /// Process rows on the rayon pool. Output order is unchanged.
    pub parallel: bool,
}

/// One successfully predicted row.
#[derive(Debug, Clone)]
pub struct BatchRow {
    pub line: usize,
    pub cells: StringRecord,
    pub result: PredictionResult,
}

#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub headers: StringRecord,
    pub rows: Vec<BatchRow>,
    /// Ingest and malformed-input errors, ordered by line.
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl BatchOutput {
    /// Number of rows with at least one failed model.
    pub fn rows_with_model_errors(&self) -> usize {
        self.rows.iter().filter(|r| !r.result.errors().is_empty()).count()
    }
}

/// Run the orchestrator over every row of `table`.
pub fn predict_batch(
    orchestrator: &Orchestrator,
    table: ListingTable,
    options: BatchOptions,
) -> Result<BatchOutput, AppError> {
    if options.policy == RowErrorPolicy::Abort {
        if let Some(err) = table.row_errors.first() {
            return Err(abort_error(err));
        }
    }

    let run = |row: &ListingRow| orchestrator.predict(&table.raw_record(row));
    let outcomes: Vec<Result<PredictionResult, PipelineError>> = if options.parallel {
        table.rows.par_iter().map(run).collect()
    } else {
        table.rows.iter().map(run).collect()
    };

    let mut rows = Vec::with_capacity(table.rows.len());
    let mut row_errors = table.row_errors;

    for (row, outcome) in table.rows.into_iter().zip(outcomes) {
        match outcome {
            Ok(result) => rows.push(BatchRow {
                line: row.line,
                cells: row.cells,
                result,
            }),
            Err(err) => {
                let row_error = RowError {
                    line: row.line,
                    message: err.to_string(),
                };
                if options.policy == RowErrorPolicy::Abort {
                    return Err(abort_error(&row_error));
                }
                tracing::warn!(line = row.line, "skipping row: {err}");
                row_errors.push(row_error);
            }
        }
    }

    row_errors.sort_by_key(|e| e.line);

    tracing::info!(
        rows_read = table.rows_read,
        predicted = rows.len(),
        skipped = row_errors.len(),
        "batch complete"
    );

    Ok(BatchOutput {
        headers: table.headers,
        rows,
        row_errors,
        rows_read: table.rows_read,
    })
}

/// Sequence form: one result per record, in order.
pub fn predict_records(
    orchestrator: &Orchestrator,
    records: &[RawRecord],
) -> Vec<Result<PredictionResult, PipelineError>> {
    records.iter().map(|r| orchestrator.predict(r)).collect()
}

fn abort_error(err: &RowError) -> AppError {
    AppError::new(3, format!("Batch aborted at line {}: {}", err.line, err.message))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::fields;
    use crate::error::ModelError;
    use crate::io::ingest::read_listings_from;
    use crate::models::{FeatureRow, Model};
    use crate::registry::ArtifactBundle;

    struct SizeModel;

    impl Model for SizeModel {
        fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
            row.number("Size_in_SqFt")
        }
    }

    fn orchestrator() -> Orchestrator {
        let bundle = ArtifactBundle::empty().with_rf(Arc::new(SizeModel));
        Orchestrator::new(Arc::new(bundle)).with_reference_year(2026)
    }

    const CSV: &str = "Listing_Id,Size_in_SqFt,BHK\nA,1000,2\nB,abc,2\nC,3000,\nD,,1\n";

    #[test]
    fn malformed_row_is_skipped_and_reported() {
        let table = read_listings_from(CSV.as_bytes()).unwrap();
        let out = predict_batch(&orchestrator(), table, BatchOptions::default()).unwrap();

        assert_eq!(out.rows_read, 4);
        assert_eq!(out.rows.len(), 3);
        let ids: Vec<&str> = out.rows.iter().map(|r| &r.cells[0]).collect();
        assert_eq!(ids, vec!["A", "C", "D"]);

        assert_eq!(out.row_errors.len(), 1);
        assert_eq!(out.row_errors[0].line, 3);
        assert!(out.row_errors[0].message.contains(fields::SIZE_IN_SQFT));

        // Blank size falls back to the default.
        assert_eq!(out.rows[2].result.rf_price(), Some(2750.0));
    }

    #[test]
    fn abort_policy_stops_at_first_bad_row() {
        let table = read_listings_from(CSV.as_bytes()).unwrap();
        let options = BatchOptions {
            policy: RowErrorPolicy::Abort,
            parallel: false,
        };
        let err = predict_batch(&orchestrator(), table, options).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("line 3"));
    }

    #[test]
    fn parallel_run_matches_sequential_order() {
        let mut csv = String::from("Listing_Id,Size_in_SqFt\n");
        for i in 0..200 {
            csv.push_str(&format!("L{i},{}\n", 500 + i));
        }

        let seq = predict_batch(
            &orchestrator(),
            read_listings_from(csv.as_bytes()).unwrap(),
            BatchOptions::default(),
        )
        .unwrap();
        let par = predict_batch(
            &orchestrator(),
            read_listings_from(csv.as_bytes()).unwrap(),
            BatchOptions {
                parallel: true,
                ..BatchOptions::default()
            },
        )
        .unwrap();

        let prices = |out: &BatchOutput| out.rows.iter().map(|r| r.result.rf_price()).collect::<Vec<_>>();
        assert_eq!(prices(&seq), prices(&par));
        assert_eq!(par.rows[199].result.rf_price(), Some(699.0));
    }

    #[test]
    fn record_sequence_keeps_per_record_results() {
        let records = vec![
            RawRecord::new().with(fields::SIZE_IN_SQFT, 10.0),
            RawRecord::new().with(fields::SIZE_IN_SQFT, "ten"),
            RawRecord::new(),
        ];
        let results = predict_records(&orchestrator(), &records);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().rf_price(), Some(10.0));
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().rf_price(), Some(2750.0));
    }
}
