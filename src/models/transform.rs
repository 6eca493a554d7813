//! Column transformer: feature row -> dense numeric vector.
//!
//! This is the pre-fitted preprocessing step that sits in front of every
//! estimator. Fitting happens elsewhere; here we only apply the stored
//! parameters:
//! - numeric columns are standardized with `(x - mean) / scale`
//! - categorical columns are one-hot encoded against a fixed category list;
//!   an unseen category encodes as all zeros

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::models::{FeatureRow, FeatureValue};

/// How one input column is encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSpec {
    Numeric {
        name: String,
        #[serde(default)]
        mean: f64,
        #[serde(default = "unit_scale")]
        scale: f64,
    },
    OneHot {
        name: String,
        categories: Vec<String>,
    },
}

fn unit_scale() -> f64 {
    1.0
}

impl ColumnSpec {
    pub fn name(&self) -> &str {
        match self {
            ColumnSpec::Numeric { name, .. } | ColumnSpec::OneHot { name, .. } => name,
        }
    }

    /// Number of output slots this column produces.
    pub fn width(&self) -> usize {
        match self {
            ColumnSpec::Numeric { .. } => 1,
            ColumnSpec::OneHot { categories, .. } => categories.len(),
        }
    }
}

/// Ordered list of column encoders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub columns: Vec<ColumnSpec>,
}

impl ColumnTransformer {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// Length of the vector produced by `transform`.
    pub fn output_width(&self) -> usize {
        self.columns.iter().map(ColumnSpec::width).sum()
    }

    /// Reject parameters that would make every transform fail or divide by zero.
    pub fn validate(&self) -> Result<(), String> {
        for col in &self.columns {
            if let ColumnSpec::Numeric { name, mean, scale } = col {
                if !mean.is_finite() {
                    return Err(format!("column `{name}` has a non-finite mean"));
                }
                if !(scale.is_finite() && *scale != 0.0) {
                    return Err(format!("column `{name}` has an invalid scale ({scale})"));
                }
            }
        }
        Ok(())
    }

    pub fn transform(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        let mut out = Vec::with_capacity(self.output_width());

        for col in &self.columns {
            match col {
                ColumnSpec::Numeric { name, mean, scale } => {
                    let x = row.number(name)?;
                    out.push((x - mean) / scale);
                }
                ColumnSpec::OneHot { name, categories } => {
                    let value = match row.get(name) {
                        Some(FeatureValue::Text(s)) => s.clone(),
                        Some(FeatureValue::Number(v)) => v.to_string(),
                        None => return Err(ModelError::MissingFeature(name.clone())),
                    };
                    out.extend(categories.iter().map(|c| if *c == value { 1.0 } else { 0.0 }));
                }
            }
        }

        Ok(out)
    }

    /// Names of the output slots (`City=Pune` style for one-hot columns).
    pub fn output_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.output_width());
        for col in &self.columns {
            match col {
                ColumnSpec::Numeric { name, .. } => names.push(name.clone()),
                ColumnSpec::OneHot { name, categories } => {
                    names.extend(categories.iter().map(|c| format!("{name}={c}")));
                }
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FeatureRow {
        FeatureRow::new(vec![
            ("Size_in_SqFt", FeatureValue::Number(3000.0)),
            ("City", FeatureValue::Text("Pune".to_string())),
        ])
    }

    #[test]
    fn standardizes_numeric_and_one_hot_encodes_text() {
        let t = ColumnTransformer::new(vec![
            ColumnSpec::Numeric {
                name: "Size_in_SqFt".to_string(),
                mean: 2000.0,
                scale: 500.0,
            },
            ColumnSpec::OneHot {
                name: "City".to_string(),
                categories: vec!["Mumbai".to_string(), "Pune".to_string()],
            },
        ]);

        assert_eq!(t.output_width(), 3);
        assert_eq!(t.transform(&row()).unwrap(), vec![2.0, 0.0, 1.0]);
        assert_eq!(t.output_names(), vec!["Size_in_SqFt", "City=Mumbai", "City=Pune"]);
    }

    #[test]
    fn unknown_category_encodes_as_zeros() {
        let t = ColumnTransformer::new(vec![ColumnSpec::OneHot {
            name: "City".to_string(),
            categories: vec!["Delhi".to_string(), "Chennai".to_string()],
        }]);
        assert_eq!(t.transform(&row()).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn numeric_column_over_text_is_an_error() {
        let t = ColumnTransformer::new(vec![ColumnSpec::Numeric {
            name: "City".to_string(),
            mean: 0.0,
            scale: 1.0,
        }]);
        assert!(matches!(t.transform(&row()), Err(ModelError::FeatureType { .. })));
    }

    #[test]
    fn decodes_with_default_mean_and_scale() {
        let json = r#"{"columns":[{"kind":"numeric","name":"Size_in_SqFt"}]}"#;
        let t: ColumnTransformer = serde_json::from_str(json).unwrap();
        assert!(t.validate().is_ok());
        assert_eq!(t.transform(&row()).unwrap(), vec![3000.0]);
    }

    #[test]
    fn zero_scale_fails_validation() {
        let t = ColumnTransformer::new(vec![ColumnSpec::Numeric {
            name: "Size_in_SqFt".to_string(),
            mean: 0.0,
            scale: 0.0,
        }]);
        assert!(t.validate().is_err());
    }
}
