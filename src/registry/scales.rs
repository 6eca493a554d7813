//! Regression scale table (`scales.json`).
//!
//! The regressors were trained on targets multiplied by a scale factor; the
//! orchestrator divides their raw output by it. Missing, malformed or
//! non-positive entries mean "no scaling" (1.0). This never errors.

use std::path::Path;

use serde_json::Value;

use crate::domain::ModelSlot;
use crate::models::read_json;

pub const RF_SCALE_KEY: &str = "RF_SCALE";
pub const XGB_SCALE_KEY: &str = "XGB_SCALE";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleTable {
    rf: f64,
    xgb: f64,
    present: bool,
}

impl Default for ScaleTable {
    fn default() -> Self {
        Self {
            rf: 1.0,
            xgb: 1.0,
            present: false,
        }
    }
}

impl ScaleTable {
    pub fn new(rf: f64, xgb: f64) -> Self {
        Self {
            rf: sanitize(RF_SCALE_KEY, Some(rf)),
            xgb: sanitize(XGB_SCALE_KEY, Some(xgb)),
            present: true,
        }
    }

    /// Read `path`; any failure yields the identity table.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no scale table; using 1.0 for both regressors");
            return Self::default();
        }
        match read_json::<Value>(path) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                tracing::warn!("ignoring scale table: {err}");
                Self::default()
            }
        }
    }

    /// Build from a decoded JSON document. Entries may be numbers or numeric strings.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            tracing::warn!("scale table is not a JSON object; using 1.0 for both regressors");
            return Self::default();
        };

        Self {
            rf: sanitize(RF_SCALE_KEY, map.get(RF_SCALE_KEY).and_then(as_number)),
            xgb: sanitize(XGB_SCALE_KEY, map.get(XGB_SCALE_KEY).and_then(as_number)),
            present: !map.is_empty(),
        }
    }

    pub fn rf(&self) -> f64 {
        self.rf
    }

    pub fn xgb(&self) -> f64 {
        self.xgb
    }

    /// Whether a non-empty table was read from storage.
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Scale for a regressor slot (1.0 for the classifier).
    pub fn for_slot(&self, slot: ModelSlot) -> f64 {
        match slot {
            ModelSlot::Classifier => 1.0,
            ModelSlot::RegressorRf => self.rf,
            ModelSlot::RegressorXgb => self.xgb,
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn sanitize(key: &str, value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(v) => {
            tracing::debug!(key, value = v, "unusable scale factor; using 1.0");
            1.0
        }
        None => 1.0,
    }
}
