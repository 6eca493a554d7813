//! Input/output helpers.
//!
//! - CSV ingest for batch runs (`ingest`)
//! - prediction CSV export (`export`)
//! - single-record / result JSON (`record`)

pub mod export;
pub mod ingest;
pub mod record;

pub use export::*;
pub use ingest::*;
pub use record::*;
