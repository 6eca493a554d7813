//! Model capability traits and the single-row feature table.
//!
//! Every model answers `predict(row) -> f64`. A model that can also report a
//! positive-class probability exposes that through `probabilistic()`, so
//! callers check the capability instead of assuming it.

use serde::Serialize;

use crate::error::ModelError;

/// One cell of a feature row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

/// A single-row table: ordered `(column, value)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    columns: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRow {
    pub fn new(columns: Vec<(&'static str, FeatureValue)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns.iter().find(|(col, _)| *col == name).map(|(_, v)| v)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Numeric value of `name`, or a typed error for the caller to contain.
    pub fn number(&self, name: &str) -> Result<f64, ModelError> {
        match self.get(name) {
            Some(FeatureValue::Number(v)) => Ok(*v),
            Some(FeatureValue::Text(_)) => Err(ModelError::FeatureType {
                name: name.to_string(),
                expected: "numeric",
            }),
            None => Err(ModelError::MissingFeature(name.to_string())),
        }
    }
}

/// Minimal capability every model provides.
pub trait Model: Send + Sync {
    /// Predict one scalar for one row (a regression value or a class label).
    fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError>;

    /// The probability capability, if this model has one.
    fn probabilistic(&self) -> Option<&dyn ProbabilisticModel> {
        None
    }
}

/// Refinement for classifiers that can report a positive-class probability.
pub trait ProbabilisticModel: Model {
    /// Probability of the positive class, in `[0, 1]`.
    fn predict_probability(&self, row: &FeatureRow) -> Result<f64, ModelError>;
}
