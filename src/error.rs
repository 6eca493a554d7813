//! Error types.
//!
//! - `AppError` is what the binary surfaces: a message plus a process exit code.
//! - `PipelineError` is the only error the prediction pipeline lets escape
//!   (a record whose numeric fields cannot be coerced).
//! - `ModelError` is raised by a single model call and is always contained by
//!   the orchestrator.
//! - `ArtifactError` describes why an artifact file could not be loaded; it is
//!   logged and recorded on the bundle, never propagated.

use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(2, err.to_string())
    }
}

/// Record-level failure: the record cannot be engineered at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Malformed input: `{field}` = {value:?} is not a valid {expected}")]
    MalformedInput {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Failure of a single model invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("feature `{0}` is missing from the input row")]
    MissingFeature(String),

    #[error("feature `{name}` must be {expected}")]
    FeatureType { name: String, expected: &'static str },

    #[error("estimator expects {expected} inputs but the encoded row has {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("tree split references feature index {index} but the encoded row has {width}")]
    FeatureIndex { index: usize, width: usize },

    #[error("estimator `{0}` has no trees")]
    EmptyEnsemble(&'static str),

    #[error("probability output is not supported by estimator `{0}`")]
    NoProbability(&'static str),

    #[error("model produced a non-finite value")]
    NonFinite,

    #[error("{0}")]
    Other(String),
}

/// Why an artifact file could not be turned into a usable object.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact '{path}': {message}")]
    Invalid { path: String, message: String },
}
