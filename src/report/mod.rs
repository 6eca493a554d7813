//! Terminal reporting for predictions, batch runs and artifact status.

pub mod format;

pub use format::{format_batch_summary, format_encoded, format_engineered, format_prediction, format_status};
