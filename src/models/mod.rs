//! Models consumed by the prediction pipeline.
//!
//! Models are opaque pre-fitted artifacts. The orchestrator only relies on the
//! capability traits in `model`; the JSON artifact format lives in `artifact`,
//! `transform` and `estimator`.

pub mod artifact;
pub mod estimator;
pub mod model;
pub mod transform;

pub use artifact::*;
pub use estimator::*;
pub use model::*;
pub use transform::*;
