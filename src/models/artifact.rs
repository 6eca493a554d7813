//! Serialized model artifacts.
//!
//! An artifact is a pre-fitted pipeline stored as JSON:
//!
//! ```json
//! { "name": "rf-v3", "features": { "columns": [...] }, "estimator": { "type": "forest", ... } }
//! ```
//!
//! The artifact owns its own column transformer, so it consumes the engineered
//! feature row directly.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, ModelError};
use crate::models::{ColumnTransformer, Estimator, FeatureRow, Model, ProbabilisticModel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default)]
    pub name: Option<String>,
    pub features: ColumnTransformer,
    pub estimator: Estimator,
}

impl ModelArtifact {
    pub fn new(features: ColumnTransformer, estimator: Estimator) -> Self {
        Self {
            name: None,
            features,
            estimator,
        }
    }

    /// Read and validate an artifact file.
    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let artifact: ModelArtifact = read_json(path)?;
        artifact.validate().map_err(|message| ArtifactError::Invalid {
            path: path.display().to_string(),
            message,
        })?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.features.validate()?;
        self.estimator.validate(self.features.output_width())
    }
}

impl Model for ModelArtifact {
    fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        let x = self.features.transform(row)?;
        self.estimator.predict(&x)
    }

    fn probabilistic(&self) -> Option<&dyn ProbabilisticModel> {
        if self.estimator.has_probability() {
            Some(self)
        } else {
            None
        }
    }
}

impl ProbabilisticModel for ModelArtifact {
    fn predict_probability(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        let x = self.features.transform(row)?;
        self.estimator.predict_probability(&x)
    }
}

/// Open and decode a JSON file into `T`.
pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Decode {
        path: path.display().to_string(),
        source,
    })
}
