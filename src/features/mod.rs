//! Raw listing -> engineered feature record.
//!
//! - `defaults`: default table and numeric coercion
//! - `engineer`: the derived-feature formulas

pub mod defaults;
pub mod engineer;

pub use defaults::{CoercedRecord, DEFAULTS, apply_defaults, coerce};
pub use engineer::{current_year, engineer, engineer_coerced, engineer_now};
