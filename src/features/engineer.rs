//! Feature engineering: coerced listing -> fixed-schema `EngineeredRecord`.
//!
//! Everything here is a pure function of the record and the reference year.
//! The reference year only feeds `Age_of_Property` / `Age_Category`;
//! `engineer_now` uses the current calendar year, so its output for the same
//! record changes when the year does.

use chrono::Datelike;

use crate::domain::{AgeCategory, EngineeredRecord, RawRecord};
use crate::error::PipelineError;
use crate::features::defaults::{CoercedRecord, coerce};

/// Transport score for values outside the lookup table.
pub const DEFAULT_TRANSPORT_SCORE: f64 = 0.6;

/// `Security` values (lower-cased) that count as secured.
const SECURE_VALUES: [&str; 5] = ["yes", "y", "gated", "cctv", "guard"];

/// Default, coerce and engineer one raw record.
pub fn engineer(record: &RawRecord, reference_year: i32) -> Result<EngineeredRecord, PipelineError> {
    let coerced = coerce(record)?;
    Ok(engineer_coerced(&coerced, reference_year))
}

/// `engineer` against the current local calendar year.
pub fn engineer_now(record: &RawRecord) -> Result<EngineeredRecord, PipelineError> {
    engineer(record, current_year())
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Engineer an already coerced record. Infallible.
pub fn engineer_coerced(r: &CoercedRecord, reference_year: i32) -> EngineeredRecord {
    let price = r.price_lakhs;
    let size = r.size_sqft;
    let bhk_divisor = r.bhk.max(1) as f64;

    let ppsf = price / size.max(1.0);
    let school_density = r.nearby_schools / 10.0;
    let hospital_density = r.nearby_hospitals / 10.0;
    let transport_score = transport_score(&r.transport);
    let amenity_count = amenity_count(&r.amenities);
    let age = (i64::from(reference_year) - r.year_built) as f64;
    let floor_ratio = if r.total_floors > 0.0 {
        r.floor_no / r.total_floors
    } else {
        0.0
    };

    EngineeredRecord {
        size_sqft: size,
        ppsf,
        school_density,
        hospital_density,
        transport_score,
        amenity_count,
        age,
        city_price_rank: r.city_price_rank,
        locality_ppsf_rank: r.locality_ppsf_rank,
        floor_ratio,
        amenity_score: f64::from(amenity_count) / 5.0,
        security_score: security_score(&r.security),
        transport_weighted: transport_score * ppsf,
        infra_density: (school_density + hospital_density) / 2.0,
        efficiency: ppsf * size,
        price_per_bhk: price / bhk_divisor,
        size_per_bhk: size / bhk_divisor,
        locality_hotspot: r.locality_hotspot,
        age_category: AgeCategory::from_age(age),
        state: r.state.clone(),
        city: r.city.clone(),
        locality: r.locality.clone(),
        property_type: r.property_type.clone(),
        furnished_status: r.furnished_status.clone(),
        parking_space: r.parking_space.clone(),
        security: r.security.clone(),
        facing: r.facing.clone(),
        owner_type: r.owner_type.clone(),
        availability_status: r.availability_status.clone(),
    }
}

/// Exact, case-sensitive lookup; anything else scores as "Medium".
pub fn transport_score(value: &str) -> f64 {
    match value {
        "Low" => 0.3,
        "Medium" => 0.6,
        "High" => 1.0,
        _ => DEFAULT_TRANSPORT_SCORE,
    }
}

/// Number of non-blank comma-separated tokens.
pub fn amenity_count(value: &str) -> u32 {
    value.split(',').filter(|token| !token.trim().is_empty()).count() as u32
}

pub fn security_score(value: &str) -> f64 {
    let lowered = value.to_lowercase();
    if SECURE_VALUES.contains(&lowered.as_str()) { 1.0 } else { 0.0 }
}
