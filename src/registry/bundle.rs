//! The loaded artifact set.
//!
//! A bundle is immutable once built. Every slot is optional: an absent or
//! undecodable file leaves the slot empty and, for undecodable files, adds an
//! `ArtifactIssue`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::domain::ModelSlot;
use crate::models::{ColumnTransformer, Model, ModelArtifact, read_json};
use crate::registry::ScaleTable;

pub const CLASSIFIER_FILE: &str = "final_best_classifier.json";
pub const RF_FILE: &str = "final_regressor_RF.json";
pub const XGB_FILE: &str = "final_regressor_XGB.json";
pub const PREPROCESSOR_FILE: &str = "preprocessor.json";
pub const SCALES_FILE: &str = "scales.json";

/// The five artifacts a models directory may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Classifier,
    RegressorRf,
    RegressorXgb,
    Preprocessor,
    Scales,
}

impl ArtifactKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Classifier => CLASSIFIER_FILE,
            ArtifactKind::RegressorRf => RF_FILE,
            ArtifactKind::RegressorXgb => XGB_FILE,
            ArtifactKind::Preprocessor => PREPROCESSOR_FILE,
            ArtifactKind::Scales => SCALES_FILE,
        }
    }
}

impl From<ModelSlot> for ArtifactKind {
    fn from(slot: ModelSlot) -> Self {
        match slot {
            ModelSlot::Classifier => ArtifactKind::Classifier,
            ModelSlot::RegressorRf => ArtifactKind::RegressorRf,
            ModelSlot::RegressorXgb => ArtifactKind::RegressorXgb,
        }
    }
}

/// An artifact file that existed but could not be loaded.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactIssue {
    pub kind: ArtifactKind,
    pub message: String,
}

/// Which artifacts are usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub classifier_loaded: bool,
    pub regressor_rf_loaded: bool,
    pub regressor_xgb_loaded: bool,
    pub preprocessor_loaded: bool,
    pub scales_present: bool,
}

#[derive(Clone, Default)]
pub struct ArtifactBundle {
    version: u64,
    source: Option<PathBuf>,
    classifier: Option<Arc<dyn Model>>,
    rf: Option<Arc<dyn Model>>,
    xgb: Option<Arc<dyn Model>>,
    preprocessor: Option<ColumnTransformer>,
    scales: ScaleTable,
    issues: Vec<ArtifactIssue>,
}

impl ArtifactBundle {
    /// A bundle with no artifacts (every model unavailable, identity scales).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every artifact under `dir` independently.
    pub fn load_dir(dir: &Path, version: u64) -> Self {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "models directory not found; all models unavailable");
        }

        let mut issues = Vec::new();
        let classifier = load_model(dir, ArtifactKind::Classifier, &mut issues);
        let rf = load_model(dir, ArtifactKind::RegressorRf, &mut issues);
        let xgb = load_model(dir, ArtifactKind::RegressorXgb, &mut issues);
        let preprocessor = load_preprocessor(dir, &mut issues);
        let scales = ScaleTable::load(&dir.join(SCALES_FILE));

        let bundle = Self {
            version,
            source: Some(dir.to_path_buf()),
            classifier,
            rf,
            xgb,
            preprocessor,
            scales,
            issues,
        };

        let status = bundle.status();
        tracing::info!(
            version,
            dir = %dir.display(),
            classifier = status.classifier_loaded,
            rf = status.regressor_rf_loaded,
            xgb = status.regressor_xgb_loaded,
            preprocessor = status.preprocessor_loaded,
            scales = status.scales_present,
            "artifact bundle loaded"
        );
        bundle
    }

    pub fn with_classifier(mut self, model: Arc<dyn Model>) -> Self {
        self.classifier = Some(model);
        self
    }

    pub fn with_rf(mut self, model: Arc<dyn Model>) -> Self {
        self.rf = Some(model);
        self
    }

    pub fn with_xgb(mut self, model: Arc<dyn Model>) -> Self {
        self.xgb = Some(model);
        self
    }

    pub fn with_preprocessor(mut self, preprocessor: ColumnTransformer) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    pub fn with_scales(mut self, scales: ScaleTable) -> Self {
        self.scales = scales;
        self
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Directory the bundle was read from (`None` for in-memory bundles).
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn model(&self, slot: ModelSlot) -> Option<&dyn Model> {
        let model = match slot {
            ModelSlot::Classifier => &self.classifier,
            ModelSlot::RegressorRf => &self.rf,
            ModelSlot::RegressorXgb => &self.xgb,
        };
        model.as_deref()
    }

    pub fn preprocessor(&self) -> Option<&ColumnTransformer> {
        self.preprocessor.as_ref()
    }

    pub fn scales(&self) -> &ScaleTable {
        &self.scales
    }

    pub fn issues(&self) -> &[ArtifactIssue] {
        &self.issues
    }

    pub fn status(&self) -> ArtifactStatus {
        ArtifactStatus {
            classifier_loaded: self.classifier.is_some(),
            regressor_rf_loaded: self.rf.is_some(),
            regressor_xgb_loaded: self.xgb.is_some(),
            preprocessor_loaded: self.preprocessor.is_some(),
            scales_present: self.scales.is_present(),
        }
    }
}

impl fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("version", &self.version)
            .field("source", &self.source)
            .field("status", &self.status())
            .field("scales", &self.scales)
            .field("issues", &self.issues)
            .finish()
    }
}

fn load_model(dir: &Path, kind: ArtifactKind, issues: &mut Vec<ArtifactIssue>) -> Option<Arc<dyn Model>> {
    let path = dir.join(kind.file_name());
    if !path.exists() {
        tracing::debug!(path = %path.display(), "artifact absent");
        return None;
    }
    match ModelArtifact::from_path(&path) {
        Ok(artifact) => Some(Arc::new(artifact)),
        Err(err) => {
            tracing::warn!("artifact unavailable: {err}");
            issues.push(ArtifactIssue {
                kind,
                message: err.to_string(),
            });
            None
        }
    }
}

fn load_preprocessor(dir: &Path, issues: &mut Vec<ArtifactIssue>) -> Option<ColumnTransformer> {
    let path = dir.join(PREPROCESSOR_FILE);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "artifact absent");
        return None;
    }
    let loaded = read_json::<ColumnTransformer>(&path)
        .map_err(|e| e.to_string())
        .and_then(|t| t.validate().map(|()| t));
    match loaded {
        Ok(transformer) => Some(transformer),
        Err(message) => {
            tracing::warn!("preprocessor unavailable: {message}");
            issues.push(ArtifactIssue {
                kind: ArtifactKind::Preprocessor,
                message,
            });
            None
        }
    }
}
