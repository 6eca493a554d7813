//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw listing input (`RawRecord`, `RawValue`, field names)
//! - the engineered feature record (`EngineeredRecord`)
//! - prediction outputs (`PredictionResult`, `ModelOutcome`, etc.)

pub mod types;

pub use types::*;
