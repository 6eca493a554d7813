//! Formatted terminal output for predictions, batch runs and artifact status.
//!
//! Formatting lives here so the pipeline code only deals in typed results and
//! output changes stay localized.

use crate::domain::{Classification, EngineeredRecord, ModelOutcome, PredictionResult, Regression};
use crate::models::FeatureValue;
use crate::predict::BatchOutput;
use crate::registry::{ArtifactBundle, ArtifactKind};

/// Row errors listed in a batch summary before the rest are elided.
const MAX_LISTED_ROW_ERRORS: usize = 10;

/// Format one prediction, optionally followed by the engineered feature table.
pub fn format_prediction(result: &PredictionResult, show_engineered: bool) -> String {
    let mut out = String::new();

    out.push_str("=== advisor - Investment Prediction ===\n");
    out.push_str(&format!("{:<20} {}\n", "Good investment:", fmt_classification(&result.classifier)));
    out.push_str(&format!("{:<20} {}\n", "Price in 5y (RF):", fmt_regression(&result.rf)));
    out.push_str(&format!("{:<20} {}\n", "Price in 5y (XGB):", fmt_regression(&result.xgb)));

    if show_engineered {
        out.push('\n');
        out.push_str(&format_engineered(&result.engineered));
    }

    out
}

/// Two-column table of the engineered feature row.
pub fn format_engineered(engineered: &EngineeredRecord) -> String {
    let mut out = String::new();
    out.push_str("Engineered features:\n");
    out.push_str(format!("{:<28} {:>20}", "feature", "value").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<28} {:-<20}", "", "").trim_end());
    out.push('\n');

    let row = engineered.to_row();
    for name in row.column_names() {
        let value = match row.get(name) {
            Some(FeatureValue::Number(v)) => format!("{v:.4}"),
            Some(FeatureValue::Text(s)) => truncate(s, 20),
            None => String::new(),
        };
        out.push_str(format!("{name:<28} {value:>20}").trim_end());
        out.push('\n');
    }

    out
}

/// Named encoded vector produced by the standalone preprocessor.
pub fn format_encoded(names: &[String], values: &[f64]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Encoded vector (width={}):\n", values.len()));
    for (name, value) in names.iter().zip(values) {
        if *value != 0.0 {
            out.push_str(&format!("  {:<40} {value:>10.4}\n", truncate(name, 40)));
        }
    }
    let zeros = values.iter().filter(|v| **v == 0.0).count();
    if zeros > 0 {
        out.push_str(&format!("  ({zeros} zero entries omitted)\n"));
    }
    out
}

/// Summarize a batch run: counts plus the first few row errors.
pub fn format_batch_summary(output: &BatchOutput) -> String {
    let mut out = String::new();

    out.push_str("=== advisor - Batch Summary ===\n");
    out.push_str(&format!(
        "Rows: read={} | predicted={} | skipped={} | with model errors={}\n",
        output.rows_read,
        output.rows.len(),
        output.row_errors.len(),
        output.rows_with_model_errors(),
    ));

    if !output.row_errors.is_empty() {
        out.push_str("\nSkipped rows:\n");
        for err in output.row_errors.iter().take(MAX_LISTED_ROW_ERRORS) {
            out.push_str(&format!("  line {:>6}: {}\n", err.line, err.message));
        }
        let rest = output.row_errors.len().saturating_sub(MAX_LISTED_ROW_ERRORS);
        if rest > 0 {
            out.push_str(&format!("  ... and {rest} more\n"));
        }
    }

    out
}

/// Which artifacts are loaded, plus any decode problems.
pub fn format_status(bundle: &ArtifactBundle) -> String {
    let status = bundle.status();
    let mut out = String::new();

    out.push_str("=== advisor - Artifact Status ===\n");
    match bundle.source() {
        Some(dir) => out.push_str(&format!("Models dir: {} (version {})\n", dir.display(), bundle.version())),
        None => out.push_str("Models dir: (none)\n"),
    }
    out.push('\n');

    let rows = [
        (ArtifactKind::Classifier, status.classifier_loaded),
        (ArtifactKind::RegressorRf, status.regressor_rf_loaded),
        (ArtifactKind::RegressorXgb, status.regressor_xgb_loaded),
        (ArtifactKind::Preprocessor, status.preprocessor_loaded),
        (ArtifactKind::Scales, status.scales_present),
    ];
    for (kind, ok) in rows {
        let mark = if ok { "loaded" } else { "missing" };
        out.push_str(format!("{:<28} {mark}", kind.file_name()).trim_end());
        out.push('\n');
    }

    let scales = bundle.scales();
    out.push_str(&format!("\nScales: RF={} XGB={}\n", scales.rf(), scales.xgb()));

    if !bundle.issues().is_empty() {
        out.push_str("\nIssues:\n");
        for issue in bundle.issues() {
            out.push_str(&format!("  {}: {}\n", issue.kind.file_name(), issue.message));
        }
    }

    out
}

fn fmt_classification(outcome: &ModelOutcome<Classification>) -> String {
    match outcome {
        ModelOutcome::Ok(c) => {
            let verdict = if c.label == 1 { "Yes" } else { "No" };
            match c.probability {
                Some(p) => format!("{verdict} (label={}, p={p:.3})", c.label),
                None => format!("{verdict} (label={})", c.label),
            }
        }
        other => fmt_not_ok(other),
    }
}

fn fmt_regression(outcome: &ModelOutcome<Regression>) -> String {
    match outcome {
        ModelOutcome::Ok(r) => format!("{:.2} lakhs", r.adjusted),
        other => fmt_not_ok(other),
    }
}

fn fmt_not_ok<T>(outcome: &ModelOutcome<T>) -> String {
    match outcome {
        ModelOutcome::Disabled => "disabled".to_string(),
        ModelOutcome::Unavailable => "unavailable (artifact not loaded)".to_string(),
        ModelOutcome::Failed { message } => format!("error: {message}"),
        ModelOutcome::Ok(_) => String::new(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
