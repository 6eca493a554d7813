//! Defaulting and type coercion for raw listing records.
//!
//! A field takes its default when it is absent or null. A present value is
//! kept even when it is falsy (`0`, `""`). Numeric fields must then parse;
//! a value that does not is a `MalformedInput` error for the whole record.

use crate::domain::{RawRecord, RawValue, fields};
use crate::error::PipelineError;

/// Default for one raw field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Number(f64),
    Text(&'static str),
}

/// The fixed default table (20 entries).
pub const DEFAULTS: [(&str, DefaultValue); 20] = [
    (fields::PRICE_IN_LAKHS, DefaultValue::Number(254.0)),
    (fields::SIZE_IN_SQFT, DefaultValue::Number(2750.0)),
    (fields::BHK, DefaultValue::Number(3.0)),
    (fields::YEAR_BUILT, DefaultValue::Number(2006.0)),
    (fields::NEARBY_SCHOOLS, DefaultValue::Number(5.0)),
    (fields::NEARBY_HOSPITALS, DefaultValue::Number(5.0)),
    (fields::PUBLIC_TRANSPORT_ACCESSIBILITY, DefaultValue::Text("Medium")),
    (fields::AMENITIES, DefaultValue::Text("")),
    (fields::FLOOR_NO, DefaultValue::Number(15.0)),
    (fields::TOTAL_FLOORS, DefaultValue::Number(15.0)),
    (fields::STATE, DefaultValue::Text("missing")),
    (fields::CITY, DefaultValue::Text("missing")),
    (fields::LOCALITY, DefaultValue::Text("missing")),
    (fields::PROPERTY_TYPE, DefaultValue::Text("Apartment")),
    (fields::FURNISHED_STATUS, DefaultValue::Text("Unfurnished")),
    (fields::PARKING_SPACE, DefaultValue::Text("No")),
    (fields::SECURITY, DefaultValue::Text("No")),
    (fields::FACING, DefaultValue::Text("North")),
    (fields::OWNER_TYPE, DefaultValue::Text("Owner")),
    (fields::AVAILABILITY_STATUS, DefaultValue::Text("Ready_to_Move")),
];

/// Default for the three externally supplied ranking scores.
pub const DEFAULT_RANK_SCORE: f64 = 0.5;

/// Return a copy of `record` with every default-table field populated.
pub fn apply_defaults(record: &RawRecord) -> RawRecord {
    let mut out = record.clone();
    for (key, default) in DEFAULTS {
        if out.get(key).is_none() {
            let value = match default {
                DefaultValue::Number(v) => RawValue::Number(v),
                DefaultValue::Text(s) => RawValue::Text(s.to_string()),
            };
            out.insert(key, value);
        }
    }
    out
}

/// A fully populated, typed listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedRecord {
    pub price_lakhs: f64,
    pub size_sqft: f64,
    pub bhk: i64,
    pub year_built: i64,
    pub floor_no: f64,
    pub total_floors: f64,
    pub nearby_schools: f64,
    pub nearby_hospitals: f64,
    pub transport: String,
    pub amenities: String,
    pub state: String,
    pub city: String,
    pub locality: String,
    pub property_type: String,
    pub furnished_status: String,
    pub parking_space: String,
    pub security: String,
    pub facing: String,
    pub owner_type: String,
    pub availability_status: String,
    pub city_price_rank: f64,
    pub locality_ppsf_rank: f64,
    pub locality_hotspot: f64,
}

/// Apply defaults and coerce every field to its target type.
pub fn coerce(record: &RawRecord) -> Result<CoercedRecord, PipelineError> {
    let r = apply_defaults(record);

    Ok(CoercedRecord {
        price_lakhs: number(&r, fields::PRICE_IN_LAKHS)?,
        size_sqft: number(&r, fields::SIZE_IN_SQFT)?,
        bhk: integer(&r, fields::BHK)?,
        year_built: integer(&r, fields::YEAR_BUILT)?,
        floor_no: number(&r, fields::FLOOR_NO)?,
        total_floors: number(&r, fields::TOTAL_FLOORS)?,
        nearby_schools: number(&r, fields::NEARBY_SCHOOLS)?,
        nearby_hospitals: number(&r, fields::NEARBY_HOSPITALS)?,
        transport: text(&r, fields::PUBLIC_TRANSPORT_ACCESSIBILITY),
        amenities: text(&r, fields::AMENITIES),
        state: text(&r, fields::STATE),
        city: text(&r, fields::CITY),
        locality: text(&r, fields::LOCALITY),
        property_type: text(&r, fields::PROPERTY_TYPE),
        furnished_status: text(&r, fields::FURNISHED_STATUS),
        parking_space: text(&r, fields::PARKING_SPACE),
        security: text(&r, fields::SECURITY),
        facing: text(&r, fields::FACING),
        owner_type: text(&r, fields::OWNER_TYPE),
        availability_status: text(&r, fields::AVAILABILITY_STATUS),
        city_price_rank: optional_number(&r, fields::CITY_PRICE_RANK, DEFAULT_RANK_SCORE)?,
        locality_ppsf_rank: optional_number(&r, fields::LOCALITY_PPSF_RANK, DEFAULT_RANK_SCORE)?,
        locality_hotspot: optional_number(&r, fields::LOCALITY_HOTSPOT_SCORE, DEFAULT_RANK_SCORE)?,
    })
}

fn text(r: &RawRecord, key: &'static str) -> String {
    r.get(key).map(ToString::to_string).unwrap_or_default()
}

fn number(r: &RawRecord, key: &'static str) -> Result<f64, PipelineError> {
    match r.get(key) {
        Some(value) => parse_number(key, value),
        // Only reachable for keys outside the default table.
        None => Err(malformed(key, "", "number")),
    }
}

fn optional_number(r: &RawRecord, key: &'static str, default: f64) -> Result<f64, PipelineError> {
    match r.get(key) {
        Some(value) => parse_number(key, value),
        None => Ok(default),
    }
}

/// Integer fields accept fractional input and truncate toward zero.
fn integer(r: &RawRecord, key: &'static str) -> Result<i64, PipelineError> {
    let v = number(r, key)?;
    if v.abs() >= i64::MAX as f64 {
        return Err(malformed(key, &v.to_string(), "integer"));
    }
    Ok(v.trunc() as i64)
}

fn parse_number(key: &'static str, value: &RawValue) -> Result<f64, PipelineError> {
    let v = match value {
        RawValue::Number(v) => *v,
        RawValue::Bool(b) => f64::from(u8::from(*b)),
        RawValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| malformed(key, s, "number"))?,
        RawValue::Null => return Err(malformed(key, "", "number")),
    };
    if v.is_finite() {
        Ok(v)
    } else {
        Err(malformed(key, &value.to_string(), "finite number"))
    }
}

fn malformed(field: &'static str, value: &str, expected: &'static str) -> PipelineError {
    PipelineError::MalformedInput {
        field,
        value: value.to_string(),
        expected,
    }
}
