//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built from CLI flags, JSON files or CSV rows
//! - handed to models as a single-row feature table
//! - exported to JSON/CSV

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{FeatureRow, FeatureValue};

/// Raw listing field names, as they appear in forms and CSV headers.
pub mod fields {
    pub const PRICE_IN_LAKHS: &str = "Price_in_Lakhs";
    pub const SIZE_IN_SQFT: &str = "Size_in_SqFt";
    pub const BHK: &str = "BHK";
    pub const YEAR_BUILT: &str = "Year_Built";
    pub const FLOOR_NO: &str = "Floor_No";
    pub const TOTAL_FLOORS: &str = "Total_Floors";
    pub const NEARBY_SCHOOLS: &str = "Nearby_Schools";
    pub const NEARBY_HOSPITALS: &str = "Nearby_Hospitals";
    pub const PUBLIC_TRANSPORT_ACCESSIBILITY: &str = "Public_Transport_Accessibility";
    pub const AMENITIES: &str = "Amenities";
    pub const STATE: &str = "State";
    pub const CITY: &str = "City";
    pub const LOCALITY: &str = "Locality";
    pub const PROPERTY_TYPE: &str = "Property_Type";
    pub const FURNISHED_STATUS: &str = "Furnished_Status";
    pub const PARKING_SPACE: &str = "Parking_Space";
    pub const SECURITY: &str = "Security";
    pub const FACING: &str = "Facing";
    pub const OWNER_TYPE: &str = "Owner_Type";
    pub const AVAILABILITY_STATUS: &str = "Availability_Status";

    /// Externally supplied ranking scores (not part of the default table).
    pub const CITY_PRICE_RANK: &str = "City_Price_Rank";
    pub const LOCALITY_PPSF_RANK: &str = "Locality_PPSF_Rank";
    pub const LOCALITY_HOTSPOT_SCORE: &str = "Locality_Hotspot_Score";
}

/// A single raw scalar as supplied by a form, a JSON file or a CSV cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    /// Numeric fields read it as 1/0; text fields as `True`/`False`.
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => Ok(()),
            RawValue::Bool(true) => f.write_str("True"),
            RawValue::Bool(false) => f.write_str("False"),
            RawValue::Number(v) => write!(f, "{v}"),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// One property listing: field name -> raw scalar.
///
/// Any field may be absent or null. Unknown keys are carried but ignored by
/// feature engineering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    values: HashMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<RawValue> {
        self.values.remove(key)
    }

    /// Value for `key`, treating an explicit null the same as absence.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Which models the caller wants to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledModels {
    pub classifier: bool,
    pub rf: bool,
    pub xgb: bool,
}

impl Default for EnabledModels {
    fn default() -> Self {
        Self {
            classifier: true,
            rf: true,
            xgb: true,
        }
    }
}

/// Three-bucket property age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeCategory {
    New,
    Mid,
    Old,
}

impl AgeCategory {
    /// `New` up to and including 10 years, `Mid` up to and including 20.
    pub fn from_age(age: f64) -> Self {
        if age <= 10.0 {
            AgeCategory::New
        } else if age <= 20.0 {
            AgeCategory::Mid
        } else {
            AgeCategory::Old
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgeCategory::New => "New",
            AgeCategory::Mid => "Mid",
            AgeCategory::Old => "Old",
        }
    }
}

/// Column names of the engineered feature table, in model input order.
pub const FEATURE_COLUMNS: [&str; 29] = [
    "Size_in_SqFt",
    "PPSF_Recalc",
    "School_Density_Score",
    "Hospital_Density_Score",
    "Transport_Score",
    "Amenity_Count",
    "Age_of_Property",
    "City_Price_Rank",
    "Locality_PPSF_Rank",
    "Floor_Ratio",
    "Amenity_Score",
    "Security_Score",
    "Transport_Weighted",
    "Infra_Density",
    "Efficiency",
    "Price_per_BHK",
    "Size_per_BHK",
    "Locality_Hotspot_Score",
    "Age_Category",
    "State",
    "City",
    "Locality",
    "Property_Type",
    "Furnished_Status",
    "Parking_Space",
    "Security",
    "Facing",
    "Owner_Type",
    "Availability_Status",
];

/// The fixed-schema feature record consumed by every model.
///
/// The key set is the same for every record regardless of which raw fields
/// were supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineeredRecord {
    #[serde(rename = "Size_in_SqFt")]
    pub size_sqft: f64,
    #[serde(rename = "PPSF_Recalc")]
    pub ppsf: f64,
    #[serde(rename = "School_Density_Score")]
    pub school_density: f64,
    #[serde(rename = "Hospital_Density_Score")]
    pub hospital_density: f64,
    #[serde(rename = "Transport_Score")]
    pub transport_score: f64,
    #[serde(rename = "Amenity_Count")]
    pub amenity_count: u32,
    #[serde(rename = "Age_of_Property")]
    pub age: f64,
    #[serde(rename = "City_Price_Rank")]
    pub city_price_rank: f64,
    #[serde(rename = "Locality_PPSF_Rank")]
    pub locality_ppsf_rank: f64,
    #[serde(rename = "Floor_Ratio")]
    pub floor_ratio: f64,
    #[serde(rename = "Amenity_Score")]
    pub amenity_score: f64,
    #[serde(rename = "Security_Score")]
    pub security_score: f64,
    #[serde(rename = "Transport_Weighted")]
    pub transport_weighted: f64,
    #[serde(rename = "Infra_Density")]
    pub infra_density: f64,
    #[serde(rename = "Efficiency")]
    pub efficiency: f64,
    #[serde(rename = "Price_per_BHK")]
    pub price_per_bhk: f64,
    #[serde(rename = "Size_per_BHK")]
    pub size_per_bhk: f64,
    #[serde(rename = "Locality_Hotspot_Score")]
    pub locality_hotspot: f64,
    #[serde(rename = "Age_Category")]
    pub age_category: AgeCategory,

    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Locality")]
    pub locality: String,
    #[serde(rename = "Property_Type")]
    pub property_type: String,
    #[serde(rename = "Furnished_Status")]
    pub furnished_status: String,
    #[serde(rename = "Parking_Space")]
    pub parking_space: String,
    #[serde(rename = "Security")]
    pub security: String,
    #[serde(rename = "Facing")]
    pub facing: String,
    #[serde(rename = "Owner_Type")]
    pub owner_type: String,
    #[serde(rename = "Availability_Status")]
    pub availability_status: String,
}

impl EngineeredRecord {
    /// Reshape into the single-row table models consume (`FEATURE_COLUMNS` order).
    pub fn to_row(&self) -> FeatureRow {
        use FeatureValue::{Number, Text};

        let values = [
            Number(self.size_sqft),
            Number(self.ppsf),
            Number(self.school_density),
            Number(self.hospital_density),
            Number(self.transport_score),
            Number(f64::from(self.amenity_count)),
            Number(self.age),
            Number(self.city_price_rank),
            Number(self.locality_ppsf_rank),
            Number(self.floor_ratio),
            Number(self.amenity_score),
            Number(self.security_score),
            Number(self.transport_weighted),
            Number(self.infra_density),
            Number(self.efficiency),
            Number(self.price_per_bhk),
            Number(self.size_per_bhk),
            Number(self.locality_hotspot),
            Text(self.age_category.as_str().to_string()),
            Text(self.state.clone()),
            Text(self.city.clone()),
            Text(self.locality.clone()),
            Text(self.property_type.clone()),
            Text(self.furnished_status.clone()),
            Text(self.parking_space.clone()),
            Text(self.security.clone()),
            Text(self.facing.clone()),
            Text(self.owner_type.clone()),
            Text(self.availability_status.clone()),
        ];

        FeatureRow::new(FEATURE_COLUMNS.into_iter().zip(values).collect())
    }
}

/// The three model slots the orchestrator fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSlot {
    Classifier,
    RegressorRf,
    RegressorXgb,
}

impl ModelSlot {
    pub const ALL: [ModelSlot; 3] = [ModelSlot::Classifier, ModelSlot::RegressorRf, ModelSlot::RegressorXgb];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelSlot::Classifier => "classifier",
            ModelSlot::RegressorRf => "RF regressor",
            ModelSlot::RegressorXgb => "XGB regressor",
        }
    }
}

/// What happened to one model slot for one record.
///
/// `Disabled` and `Unavailable` are not errors; only `Failed` carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelOutcome<T> {
    Disabled,
    Unavailable,
    Ok(T),
    Failed { message: String },
}

impl<T> ModelOutcome<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            ModelOutcome::Ok(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ModelOutcome::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Classifier output for one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: i64,
    /// Positive-class probability, `None` when the model has no probability output.
    pub probability: Option<f64>,
}

/// Regressor output for one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    /// Value as returned by the model (training-time scale).
    pub raw: f64,
    /// `raw / scale`, in real-world units.
    pub adjusted: f64,
}

/// Per-record output of the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub engineered: EngineeredRecord,
    pub classifier: ModelOutcome<Classification>,
    pub rf: ModelOutcome<Regression>,
    pub xgb: ModelOutcome<Regression>,
}

impl PredictionResult {
    pub fn investment_label(&self) -> Option<i64> {
        self.classifier.value().map(|c| c.label)
    }

    pub fn investment_probability(&self) -> Option<f64> {
        self.classifier.value().and_then(|c| c.probability)
    }

    pub fn rf_price(&self) -> Option<f64> {
        self.rf.value().map(|r| r.adjusted)
    }

    pub fn xgb_price(&self) -> Option<f64> {
        self.xgb.value().map(|r| r.adjusted)
    }

    /// Per-model error messages, in slot order.
    pub fn errors(&self) -> Vec<(ModelSlot, &str)> {
        let mut out = Vec::new();
        if let Some(msg) = self.classifier.error() {
            out.push((ModelSlot::Classifier, msg));
        }
        if let Some(msg) = self.rf.error() {
            out.push((ModelSlot::RegressorRf, msg));
        }
        if let Some(msg) = self.xgb.error() {
            out.push((ModelSlot::RegressorXgb, msg));
        }
        out
    }
}
