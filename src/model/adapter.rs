//! The loaded model, shared read-only by every prediction.

use std::fmt;
use std::time::Instant;

use crate::common::error::{ModelLoadError, PredictionError};
use crate::common::fingerprint::Fingerprint;
use crate::mix::domain::MixInput;

use super::artifact::ModelArtifact;
use super::domain::{ModelInfo, ModelSource, Regressor};
use super::repo_fs::FsModelRepo;

/// Holds one regressor for the life of the process.
///
/// Construct once at startup and share through an `Arc`; nothing is mutated
/// after construction.
pub struct ModelAdapter {
    regressor: Box<dyn Regressor>,
    info: ModelInfo,
}

impl ModelAdapter {
    /// Load and check an artifact. Failures are logged at `error`.
    pub fn load(source: &ModelSource) -> Result<Self, ModelLoadError> {
        Self::load_with(&FsModelRepo::default(), source)
    }

    pub fn load_with(repo: &FsModelRepo, source: &ModelSource) -> Result<Self, ModelLoadError> {
        let start = Instant::now();
        let loaded = Self::try_load(repo, source);
        match &loaded {
            Ok(adapter) => tracing::info!(
                source = %source,
                model = %adapter.info.name,
                kind = ?adapter.info.kind,
                fingerprint = adapter.info.fingerprint.as_deref().unwrap_or_default(),
                dur_ms = start.elapsed().as_millis() as u64,
                "model loaded"
            ),
            Err(err) => tracing::error!(source = %source, error = %err, "model load failed"),
        }
        loaded
    }

    fn try_load(repo: &FsModelRepo, source: &ModelSource) -> Result<Self, ModelLoadError> {
        let bytes = repo.read(source)?;
        let fingerprint = Fingerprint::of(&bytes).finish_hex();
        let artifact = ModelArtifact::from_slice(&bytes)?;
        let name = artifact.name.clone();
        let regressor = artifact.into_regressor()?;
        Ok(Self {
            info: ModelInfo {
                name,
                kind: regressor.kind(),
                fingerprint: Some(fingerprint),
            },
            regressor,
        })
    }

    /// Wrap an already constructed regressor, e.g. a different backend or a test stub.
    pub fn from_regressor(name: impl Into<String>, regressor: Box<dyn Regressor>) -> Self {
        Self {
            info: ModelInfo {
                name: name.into(),
                kind: regressor.kind(),
                fingerprint: None,
            },
            regressor,
        }
    }

    /// Estimated compressive strength in MPa.
    ///
    /// Features are passed in the fixed model order. Non-finite outputs are
    /// rejected so they never reach classification.
    pub fn predict(&self, mix: &MixInput) -> Result<f64, PredictionError> {
        let strength = self.regressor.predict(&mix.to_features())?;
        if !strength.is_finite() {
            return Err(PredictionError::NonFinite(strength));
        }
        Ok(strength)
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }
}

impl fmt::Debug for ModelAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelAdapter").field("info", &self.info).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;
    use crate::mix::domain::{FeatureVector, MixValues};
    use crate::model::domain::ModelKind;

    fn artifact_bytes() -> Vec<u8> {
        json!({
            "name": "illustrative-linear",
            "features": ["Cement", "Blast_Furnace_Slag", "Fly_Ash", "Water",
                         "Superplasticizer", "Coarse_Aggregate", "Fine_Aggregate", "Age"],
            "model": {
                "kind": "linear",
                "intercept": -20.0,
                "coefficients": [0.12, 0.08, 0.07, -0.15, 0.5, 0.01, 0.01, 0.2]
            }
        })
        .to_string()
        .into_bytes()
    }

    fn mix() -> MixInput {
        MixInput::new(MixValues {
            cement: 300.0,
            blast_furnace_slag: 100.0,
            fly_ash: 50.0,
            water: 180.0,
            superplasticizer: 10.0,
            coarse_aggregate: 1000.0,
            fine_aggregate: 800.0,
            age: 28.0,
        })
        .unwrap()
    }

    struct Constant(f64);

    impl Regressor for Constant {
        fn predict(&self, _: &FeatureVector) -> Result<f64, PredictionError> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl Regressor for Failing {
        fn predict(&self, _: &FeatureVector) -> Result<f64, PredictionError> {
            Err(PredictionError::Backend("remote model unavailable".into()))
        }
    }

    #[test]
    fn loads_from_file_and_predicts() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(&artifact_bytes()).expect("write artifact");

        let adapter = ModelAdapter::load(&ModelSource::Path(file.path().to_path_buf())).unwrap();
        assert_eq!(adapter.info().name, "illustrative-linear");
        assert_eq!(adapter.info().kind, ModelKind::Linear);
        assert_eq!(
            adapter.info().fingerprint.as_deref(),
            Some(Fingerprint::of(&artifact_bytes()).finish_hex().as_str())
        );

        let strength = adapter.predict(&mix()).unwrap();
        assert!((strength - 56.1).abs() < 1e-9);
    }

    #[test]
    fn load_from_bytes_matches_file() {
        let adapter = ModelAdapter::load(&ModelSource::Bytes(artifact_bytes())).unwrap();
        assert!((adapter.predict(&mix()).unwrap() - 56.1).abs() < 1e-9);
    }

    #[test]
    fn missing_artifact_fails_to_load() {
        let err = ModelAdapter::load(&ModelSource::Path(PathBuf::from("/no/such/model.json")))
            .unwrap_err();
        assert!(matches!(err, ModelLoadError::Io { .. }));
    }

    #[test]
    fn non_finite_output_is_a_prediction_error() {
        let adapter = ModelAdapter::from_regressor("nan", Box::new(Constant(f64::NAN)));
        assert!(matches!(
            adapter.predict(&mix()),
            Err(PredictionError::NonFinite(v)) if v.is_nan()
        ));

        let adapter = ModelAdapter::from_regressor("inf", Box::new(Constant(f64::INFINITY)));
        assert!(matches!(adapter.predict(&mix()), Err(PredictionError::NonFinite(_))));
    }

    #[test]
    fn backend_errors_pass_through() {
        let adapter = ModelAdapter::from_regressor("remote", Box::new(Failing));
        assert_eq!(
            adapter.predict(&mix()),
            Err(PredictionError::Backend("remote model unavailable".into()))
        );
        assert_eq!(adapter.info().kind, ModelKind::External);
        assert_eq!(adapter.info().fingerprint, None);
    }

    #[test]
    fn adapter_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ModelAdapter>();
    }
}
