//! Shared prediction workflow used by the CLI commands.
//!
//! artifacts -> orchestrator -> single record or CSV batch
//!
//! Command handlers only decide what to print or write.

use std::path::Path;
use std::sync::Arc;

use crate::domain::{EnabledModels, PredictionResult, RawRecord};
use crate::error::AppError;
use crate::io::read_listings;
use crate::predict::{BatchOptions, BatchOutput, Orchestrator, predict_batch};
use crate::registry::{ArtifactBundle, ArtifactRegistry};

/// Output of a single-record prediction.
#[derive(Debug, Clone)]
pub struct SingleRun {
    pub result: PredictionResult,
    /// `(column names, values)` from the standalone preprocessor, when requested
    /// and available.
    pub encoded: Option<(Vec<String>, Vec<f64>)>,
}

/// Load the artifact bundle, from `dir` if given, else from the configured
/// process-wide registry.
pub fn open_bundle(dir: Option<&Path>) -> Arc<ArtifactBundle> {
    match dir {
        Some(dir) => ArtifactRegistry::new(dir).load(),
        None => ArtifactRegistry::global().load(),
    }
}

pub fn orchestrator(bundle: Arc<ArtifactBundle>, enabled: EnabledModels, year: Option<i32>) -> Orchestrator {
    let orchestrator = Orchestrator::new(bundle).with_enabled(enabled);
    match year {
        Some(year) => orchestrator.with_reference_year(year),
        None => orchestrator,
    }
}

/// Predict one record; optionally run the preprocessor over its feature row.
pub fn run_single(orchestrator: &Orchestrator, record: &RawRecord, want_encoded: bool) -> Result<SingleRun, AppError> {
    let result = orchestrator.predict(record)?;

    let encoded = if want_encoded {
        match orchestrator.bundle().preprocessor() {
            Some(pre) => {
                let values = pre
                    .transform(&result.engineered.to_row())
                    .map_err(|e| AppError::new(4, format!("Preprocessor failed: {e}")))?;
                Some((pre.output_names(), values))
            }
            None => {
                tracing::warn!("--show-encoded requested but preprocessor.json is not loaded");
                None
            }
        }
    } else {
        None
    };

    Ok(SingleRun { result, encoded })
}

/// Read `input` and predict every row.
pub fn run_batch(orchestrator: &Orchestrator, input: &Path, options: BatchOptions) -> Result<BatchOutput, AppError> {
    let table = read_listings(input)?;
    if table.rows_read == 0 {
        return Err(AppError::new(3, format!("No data rows in '{}'.", input.display())));
    }

    let output = predict_batch(orchestrator, table, options)?;
    if output.rows.is_empty() {
        return Err(AppError::new(
            3,
            format!("No rows could be predicted ({} skipped).", output.row_errors.len()),
        ));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fields;
    use crate::models::{ColumnSpec, ColumnTransformer};
    use crate::predict::RowErrorPolicy;

    fn preprocessor() -> ColumnTransformer {
        ColumnTransformer::new(vec![
            ColumnSpec::Numeric {
                name: "Size_in_SqFt".to_string(),
                mean: 0.0,
                scale: 1.0,
            },
            ColumnSpec::OneHot {
                name: "City".to_string(),
                categories: vec!["Pune".to_string(), "Mumbai".to_string()],
            },
        ])
    }

    #[test]
    fn single_run_with_encoded_vector() {
        let bundle = Arc::new(ArtifactBundle::empty().with_preprocessor(preprocessor()));
        let orch = orchestrator(bundle, EnabledModels::default(), Some(2025));
        let record = RawRecord::new()
            .with(fields::CITY, "Mumbai")
            .with(fields::SIZE_IN_SQFT, 1200.0);

        let run = run_single(&orch, &record, true).unwrap();
        let (names, values) = run.encoded.unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(values, vec![1200.0, 0.0, 1.0]);
    }

    #[test]
    fn demo_models_predict_demo_listing() {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
        let bundle = open_bundle(Some(&demos.join("models")));
        let status = bundle.status();
        assert!(status.classifier_loaded && status.regressor_rf_loaded && status.regressor_xgb_loaded);
        assert!(status.preprocessor_loaded && status.scales_present);
        assert!(bundle.issues().is_empty());

        let record = crate::io::read_record_json(&demos.join("listing.json")).unwrap();
        let orch = orchestrator(bundle, EnabledModels::default(), Some(2026));
        let run = run_single(&orch, &record, true).unwrap();

        // RF leaves 520 and 440, halved by RF_SCALE=2.
        let rf = run.result.rf.value().unwrap();
        assert!((rf.raw - 480.0).abs() < 1e-9);
        assert!((rf.adjusted - 240.0).abs() < 1e-9);
        // 120 base + 60 (efficiency 254) - 5 (infra density 0.5).
        assert!((run.result.xgb_price().unwrap() - 175.0).abs() < 1e-9);

        assert_eq!(run.result.investment_label(), Some(1));
        let p = run.result.investment_probability().unwrap();
        assert!(p > 0.8 && p < 0.9);

        let (names, values) = run.encoded.unwrap();
        assert_eq!(names.len(), values.len());
        assert_eq!(values.len(), 12);
    }

    #[test]
    fn batch_honours_disabled_models() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "BHK,City\n2,Pune\n").unwrap();

        let enabled = EnabledModels {
            classifier: true,
            rf: false,
            xgb: true,
        };
        let orch = orchestrator(Arc::new(ArtifactBundle::empty()), enabled, Some(2025));
        let out = run_batch(&orch, &path, BatchOptions::default()).unwrap();
        assert_eq!(out.rows[0].result.rf, crate::domain::ModelOutcome::Disabled);
        assert_eq!(out.rows[0].result.xgb, crate::domain::ModelOutcome::Unavailable);
    }

    #[test]
    fn single_run_without_preprocessor() {
        let orch = orchestrator(Arc::new(ArtifactBundle::empty()), EnabledModels::default(), Some(2025));
        let run = run_single(&orch, &RawRecord::new(), true).unwrap();
        assert!(run.encoded.is_none());
    }

    #[test]
    fn batch_skips_bad_rows_and_rejects_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(Arc::new(ArtifactBundle::empty()), EnabledModels::default(), Some(2025));

        let path = dir.path().join("in.csv");
        std::fs::write(&path, "BHK,City\n2,Pune\nabc,Pune\n3,Mumbai\n").unwrap();
        let out = run_batch(&orch, &path, BatchOptions::default()).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.row_errors.len(), 1);

        let abort = BatchOptions {
            policy: RowErrorPolicy::Abort,
            parallel: false,
        };
        assert_eq!(run_batch(&orch, &path, abort).unwrap_err().exit_code(), 3);

        let empty = dir.path().join("empty.csv");
        std::fs::write(&empty, "BHK,City\n").unwrap();
        assert_eq!(run_batch(&orch, &empty, BatchOptions::default()).unwrap_err().exit_code(), 3);
    }
}
