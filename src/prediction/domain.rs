//! Output of one successful prediction.

use serde::Serialize;

use crate::grading::{Category, GaugeSpec};

/// Strength estimate with its category, advice and gauge.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictionResult {
    pub strength_mpa: f64,
    pub category: Category,
    pub recommendation: String,
    pub gauge: GaugeSpec,
}

impl PredictionResult {
    /// Headline for display, e.g. `Estimated strength: 56.10 MPa (HIGH)`.
    pub fn summary(&self) -> String {
        format!(
            "Estimated strength: {:.2} MPa ({})",
            self.strength_mpa,
            self.category.as_str()
        )
    }
}
