//! Contract between the prediction pipeline and a trained regressor.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::common::error::PredictionError;
use crate::mix::domain::FeatureVector;

/// Anything that maps eight ordered features to one strength value.
///
/// Implementations are shared across threads for the life of the process and
/// must not mutate state during `predict`.
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError>;

    fn kind(&self) -> ModelKind {
        ModelKind::External
    }
}

/// Model families the artifact loader understands.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    TreeEnsemble,
    /// Injected by the host; not loaded from an artifact.
    External,
}

/// Where a serialised artifact comes from.
#[derive(Clone, Debug)]
pub enum ModelSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Path(path) => write!(f, "{}", path.display()),
            ModelSource::Bytes(bytes) => write!(f, "<{} bytes in memory>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ModelSource {
    fn from(path: PathBuf) -> Self {
        ModelSource::Path(path)
    }
}

/// Identity of the loaded model, reported alongside predictions and logs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub kind: ModelKind,
    /// FNV-1a of the artifact bytes; absent for injected regressors.
    pub fingerprint: Option<String>,
}
