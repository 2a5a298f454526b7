//! Prediction orchestration: validate, infer, classify, render.

use std::sync::{mpsc, Arc};
use std::time::Instant;

use crate::common::error::{Error, Result};
use crate::grading::{GaugeRenderer, StrengthBands, StrengthClassifier};
use crate::mix::domain::{MixInput, RawMix};
use crate::mix::service::validate;
use crate::model::{ModelAdapter, ModelInfo};

use super::domain::PredictionResult;
use super::workers::Pool;

/// Stateless apart from the shared model; safe to call from many threads.
///
/// Every call re-runs the model. Nothing is cached.
pub struct PredictionService {
    model: Arc<ModelAdapter>,
    classifier: StrengthClassifier,
    gauge: GaugeRenderer,
}

impl PredictionService {
    pub fn new(model: Arc<ModelAdapter>) -> Self {
        Self::with_bands(model, StrengthBands::STANDARD)
    }

    /// Classifier and gauge share `bands`.
    pub fn with_bands(model: Arc<ModelAdapter>, bands: StrengthBands) -> Self {
        Self {
            model,
            classifier: StrengthClassifier::new(bands),
            gauge: GaugeRenderer::new(bands),
        }
    }

    pub fn model(&self) -> &ModelInfo {
        self.model.info()
    }

    /// Validate `raw` and predict. Validation errors are returned before the
    /// model is touched.
    pub fn predict(&self, raw: &RawMix) -> Result<PredictionResult> {
        let span = tracing::info_span!("predict", model = %self.model.info().name);
        let _enter = span.enter();

        let mix = validate(raw).map_err(|err| {
            tracing::debug!(error = %err, field = %err.field(), "mix rejected");
            err
        })?;
        self.run(&mix)
    }

    /// Predict for an already validated mix.
    pub fn predict_mix(&self, mix: &MixInput) -> Result<PredictionResult> {
        let span = tracing::info_span!("predict", model = %self.model.info().name);
        let _enter = span.enter();
        self.run(mix)
    }

    fn run(&self, mix: &MixInput) -> Result<PredictionResult> {
        let start = Instant::now();
        let strength_mpa = self.model.predict(mix).map_err(|err| {
            tracing::warn!(error = %err, "prediction failed");
            err
        })?;

        let (category, recommendation) = self.classifier.classify(strength_mpa);
        let gauge = self.gauge.render(strength_mpa);

        tracing::info!(
            strength_mpa,
            category = category.as_str(),
            dur_us = start.elapsed().as_micros() as u64,
            "prediction"
        );

        Ok(PredictionResult {
            strength_mpa,
            category,
            recommendation: recommendation.text(),
            gauge,
        })
    }

    /// Predict every entry independently, in order.
    pub fn predict_batch(&self, raws: &[RawMix]) -> Vec<Result<PredictionResult>> {
        raws.iter().map(|raw| self.predict(raw)).collect()
    }

    /// Like [`predict_batch`](Self::predict_batch) but spread over `pool`.
    /// Results come back in input order.
    pub fn predict_batch_parallel(
        self: &Arc<Self>,
        pool: &Pool,
        raws: Vec<RawMix>,
    ) -> Vec<Result<PredictionResult>> {
        let total = raws.len();
        let (tx, rx) = mpsc::channel();

        for (idx, raw) in raws.into_iter().enumerate() {
            let service = Arc::clone(self);
            let tx = tx.clone();
            pool.submit(move || {
                let _ = tx.send((idx, service.predict(&raw)));
            });
        }
        drop(tx);

        let mut slots: Vec<Option<Result<PredictionResult>>> = (0..total).map(|_| None).collect();
        for (idx, result) in rx {
            slots[idx] = Some(result);
        }
        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(Error::Internal("batch job did not complete".to_string())))
            })
            .collect()
    }
}
