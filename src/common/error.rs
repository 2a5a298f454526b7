//! Error handling primitives shared across the core.
//!
//! Each stage owns its error type; [`Error`] wraps them for callers that go
//! through the whole pipeline, and [`ErrorCode`] is what crosses the FFI
//! boundary.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::mix::domain::Feature;

/// Stable error codes that cross the FFI boundary.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// Mix input failed validation.
    InvalidInput = 1,
    /// Model artifact could not be loaded.
    ModelLoad = 2,
    /// Inference failed for a single request.
    Prediction = 3,
    /// Configuration could not be read or parsed.
    Config = 4,
    /// Historical dataset could not be read.
    Dataset = 5,
    /// Catch-all for bugs and unreachable paths.
    Internal = 6,
}

/// Which side of a documented range a value fell off.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Bound {
    Min(f64),
    Max(f64),
}

impl Bound {
    pub fn value(&self) -> f64 {
        match self {
            Bound::Min(v) | Bound::Max(v) => *v,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Min(v) => write!(f, "minimum {v}"),
            Bound::Max(v) => write!(f, "maximum {v}"),
        }
    }
}

/// Rejected mix input. Always recoverable; the model is never consulted.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ValidationError {
    #[error("missing field `{field}`")]
    MissingField { field: Feature },

    #[error("field `{field}` is not a finite number")]
    NotNumeric { field: Feature },

    #[error("field `{field}` supplied more than once")]
    DuplicateField { field: Feature },

    #[error("field `{field}` = {value} is outside the {bound}")]
    OutOfRange {
        field: Feature,
        value: f64,
        bound: Bound,
    },

    #[error("field `{field}` = {value} must be a whole number")]
    NotInteger { field: Feature, value: f64 },
}

impl ValidationError {
    /// Feature the error refers to.
    pub fn field(&self) -> Feature {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::NotNumeric { field }
            | ValidationError::DuplicateField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::NotInteger { field, .. } => *field,
        }
    }
}

/// The model artifact could not be turned into a usable regressor.
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("cannot read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact is not valid: {0}")]
    Format(#[from] serde_json::Error),

    #[error("model expects {found} features, the mix has {expected}")]
    Arity { expected: usize, found: usize },

    #[error("feature #{position} is `{found}`, expected `{expected}`")]
    FeatureOrder {
        position: usize,
        expected: &'static str,
        found: String,
    },

    #[error("model artifact is inconsistent: {0}")]
    Invalid(String),
}

/// Inference failed for one request.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum PredictionError {
    #[error("model produced a non-finite strength ({0})")]
    NonFinite(f64),

    #[error("model backend failed: {0}")]
    Backend(String),
}

/// The historical dataset could not be read.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("cannot read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset has no column for {0}")]
    MissingColumn(String),

    #[error("line {line}, column `{column}`: `{value}` is not a number")]
    BadCell {
        line: u64,
        column: String,
        value: String,
    },

    #[error("dataset is empty")]
    Empty,
}

/// Canonical error type for the core.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Machine parsable code for the FFI layer.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Validation(_) => ErrorCode::InvalidInput,
            Error::ModelLoad(_) => ErrorCode::ModelLoad,
            Error::Prediction(_) => ErrorCode::Prediction,
            Error::Dataset(_) => ErrorCode::Dataset,
            Error::Config(_) => ErrorCode::Config,
            Error::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
