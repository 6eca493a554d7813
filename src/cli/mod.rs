//! Command-line parsing for the investment advisor.
//!
//! Argument parsing and command dispatch stay separate from the feature and
//! model code; this module only turns flags into typed inputs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{EnabledModels, RawRecord, RawValue, fields};
use crate::error::AppError;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "advisor", version, about = "Real-estate investment advisor")]
pub struct Cli {
    /// Directory holding the model artifacts (overrides ADVISOR_MODELS_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict investment label and 5-year price for one listing.
    Predict(PredictArgs),
    /// Predict every row of a listings CSV.
    Batch(BatchArgs),
    /// Print the engineered feature row for one listing (no models).
    Engineer(EngineerArgs),
    /// Show which model artifacts are loaded.
    Status(StatusArgs),
    /// Write a synthetic listings CSV.
    Sample(SampleArgs),
}

/// One listing, from a JSON file and/or individual flags.
///
/// Flags override values read from `--record`.
#[derive(Debug, Args, Clone, Default)]
pub struct RecordArgs {
    /// JSON object of raw listing fields.
    #[arg(long, value_name = "JSON")]
    pub record: Option<PathBuf>,

    /// Listed price (lakhs).
    #[arg(long)]
    pub price: Option<f64>,

    /// Size in square feet.
    #[arg(long)]
    pub size: Option<f64>,

    #[arg(long)]
    pub bhk: Option<f64>,

    #[arg(long)]
    pub year_built: Option<f64>,

    #[arg(long)]
    pub floor: Option<f64>,

    #[arg(long)]
    pub total_floors: Option<f64>,

    #[arg(long)]
    pub schools: Option<f64>,

    #[arg(long)]
    pub hospitals: Option<f64>,

    /// Public transport accessibility (Low, Medium, High).
    #[arg(long)]
    pub transport: Option<String>,

    /// Comma-separated amenity list.
    #[arg(long)]
    pub amenities: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub locality: Option<String>,

    #[arg(long)]
    pub property_type: Option<String>,

    #[arg(long)]
    pub furnished: Option<String>,

    #[arg(long)]
    pub parking: Option<String>,

    #[arg(long)]
    pub security: Option<String>,

    #[arg(long)]
    pub facing: Option<String>,

    #[arg(long)]
    pub owner_type: Option<String>,

    #[arg(long)]
    pub availability: Option<String>,

    /// Any raw field, e.g. `--set City_Price_Rank=0.8`. Numeric values are
    /// passed as numbers.
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
}

impl RecordArgs {
    /// Build the raw record: file first, then flags on top.
    pub fn to_record(&self) -> Result<RawRecord, AppError> {
        let mut record = match &self.record {
            Some(path) => crate::io::read_record_json(path)?,
            None => RawRecord::new(),
        };

        let numbers = [
            (fields::PRICE_IN_LAKHS, self.price),
            (fields::SIZE_IN_SQFT, self.size),
            (fields::BHK, self.bhk),
            (fields::YEAR_BUILT, self.year_built),
            (fields::FLOOR_NO, self.floor),
            (fields::TOTAL_FLOORS, self.total_floors),
            (fields::NEARBY_SCHOOLS, self.schools),
            (fields::NEARBY_HOSPITALS, self.hospitals),
        ];
        for (key, value) in numbers {
            if let Some(v) = value {
                record.insert(key, v);
            }
        }

        let texts = [
            (fields::PUBLIC_TRANSPORT_ACCESSIBILITY, &self.transport),
            (fields::AMENITIES, &self.amenities),
            (fields::STATE, &self.state),
            (fields::CITY, &self.city),
            (fields::LOCALITY, &self.locality),
            (fields::PROPERTY_TYPE, &self.property_type),
            (fields::FURNISHED_STATUS, &self.furnished),
            (fields::PARKING_SPACE, &self.parking),
            (fields::SECURITY, &self.security),
            (fields::FACING, &self.facing),
            (fields::OWNER_TYPE, &self.owner_type),
            (fields::AVAILABILITY_STATUS, &self.availability),
        ];
        for (key, value) in texts {
            if let Some(v) = value {
                record.insert(key, v.clone());
            }
        }

        for (key, value) in &self.set {
            record.insert(key.clone(), assignment_value(value));
        }

        Ok(record)
    }
}

/// Per-model switches shared by single and batch prediction.
#[derive(Debug, Args, Clone, Copy, Default)]
pub struct ModelToggleArgs {
    /// Skip the investment classifier.
    #[arg(long)]
    pub no_classifier: bool,

    /// Skip the RF price regressor.
    #[arg(long)]
    pub no_rf: bool,

    /// Skip the XGB price regressor.
    #[arg(long)]
    pub no_xgb: bool,
}

impl ModelToggleArgs {
    pub fn enabled_models(&self) -> EnabledModels {
        EnabledModels {
            classifier: !self.no_classifier,
            rf: !self.no_rf,
            xgb: !self.no_xgb,
        }
    }
}

/// Options for a single prediction.
#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub listing: RecordArgs,

    #[command(flatten)]
    pub models: ModelToggleArgs,

    /// Print the engineered feature row.
    #[arg(long)]
    pub show_engineered: bool,

    /// Print the preprocessor's encoded vector (needs preprocessor.json).
    #[arg(long)]
    pub show_encoded: bool,

    /// Reference year for property age (default: current year).
    #[arg(long)]
    pub year: Option<i32>,

    /// Write the full result as JSON.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

/// Options for a batch run.
#[derive(Debug, Parser, Clone)]
pub struct BatchArgs {
    /// Listings CSV with a header row.
    #[arg(long, short = 'i', value_name = "CSV")]
    pub input: PathBuf,

    /// Output CSV (input columns plus predictions). Printed to stdout if omitted.
    #[arg(long, short = 'o', value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Predict rows on the rayon thread pool.
    #[arg(long)]
    pub parallel: bool,

    /// Stop at the first malformed row instead of skipping it.
    #[arg(long)]
    pub abort_on_error: bool,

    #[command(flatten)]
    pub models: ModelToggleArgs,

    /// Reference year for property age (default: current year).
    #[arg(long)]
    pub year: Option<i32>,
}

/// Options for feature engineering only.
#[derive(Debug, Parser, Clone)]
pub struct EngineerArgs {
    #[command(flatten)]
    pub listing: RecordArgs,

    /// Reference year for property age (default: current year).
    #[arg(long)]
    pub year: Option<i32>,

    /// Print the engineered record as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct StatusArgs {
    /// Print the status as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Options for synthetic listing generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Number of listings to generate.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub count: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Probability of blanking each cell.
    #[arg(long, default_value_t = 0.0)]
    pub missing_rate: f64,

    /// Latest construction year (default: current year).
    #[arg(long)]
    pub max_year: Option<i32>,

    #[arg(long, short = 'o', value_name = "CSV")]
    pub output: PathBuf,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty field name in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn assignment_value(value: &str) -> RawValue {
    if value.is_empty() {
        return RawValue::Null;
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => RawValue::Number(v),
        _ => RawValue::Text(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_flags_build_record() {
        let cli = Cli::parse_from([
            "advisor",
            "predict",
            "--price",
            "120",
            "--city",
            "Pune",
            "--set",
            "City_Price_Rank=0.8",
            "--set",
            "Locality=Baner",
            "--no-xgb",
        ]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        let record = args.listing.to_record().unwrap();
        assert_eq!(record.get(fields::PRICE_IN_LAKHS), Some(&RawValue::Number(120.0)));
        assert_eq!(record.get(fields::CITY), Some(&RawValue::Text("Pune".to_string())));
        assert_eq!(record.get(fields::CITY_PRICE_RANK), Some(&RawValue::Number(0.8)));
        assert_eq!(record.get(fields::LOCALITY), Some(&RawValue::Text("Baner".to_string())));
        assert_eq!(
            args.models.enabled_models(),
            EnabledModels {
                classifier: true,
                rf: true,
                xgb: false
            }
        );
    }

    #[test]
    fn batch_accepts_model_toggles() {
        let cli = Cli::parse_from(["advisor", "batch", "-i", "listings.csv", "--no-rf", "--parallel"]);
        let Command::Batch(args) = cli.command else {
            panic!("expected batch");
        };
        assert!(args.parallel);
        assert_eq!(
            args.models.enabled_models(),
            EnabledModels {
                classifier: true,
                rf: false,
                xgb: true
            }
        );

        let cli = Cli::parse_from(["advisor", "batch", "-i", "listings.csv"]);
        let Command::Batch(args) = cli.command else {
            panic!("expected batch");
        };
        assert_eq!(args.models.enabled_models(), EnabledModels::default());
    }

    #[test]
    fn flags_override_record_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listing.json");
        std::fs::write(&path, r#"{"BHK": 2, "City": "Mumbai"}"#).unwrap();

        let args = RecordArgs {
            record: Some(path),
            city: Some("Chennai".to_string()),
            ..RecordArgs::default()
        };
        let record = args.to_record().unwrap();
        assert_eq!(record.get(fields::BHK), Some(&RawValue::Number(2.0)));
        assert_eq!(record.get(fields::CITY), Some(&RawValue::Text("Chennai".to_string())));
    }

    #[test]
    fn assignment_parsing() {
        assert_eq!(parse_assignment("A = b").unwrap(), ("A".to_string(), "b".to_string()));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
        assert_eq!(assignment_value(""), RawValue::Null);
        assert_eq!(assignment_value("NaN"), RawValue::Text("NaN".to_string()));
    }

    #[test]
    fn global_models_dir_flag() {
        let cli = Cli::parse_from(["advisor", "status", "--models-dir", "/tmp/m"]);
        assert_eq!(cli.models_dir, Some(PathBuf::from("/tmp/m")));
    }
}
