//! Prediction: single-record orchestration and batch runs.
//!
//! High-level flow for one record:
//! 1) default + coerce raw fields
//! 2) engineer the fixed feature row
//! 3) run classifier / RF / XGB independently
//! 4) divide regression outputs by their scale factor

pub mod batch;
pub mod orchestrator;

pub use batch::{BatchOptions, BatchOutput, BatchRow, PREDICTION_COLUMNS, RowErrorPolicy, predict_batch, predict_records};
pub use orchestrator::Orchestrator;
