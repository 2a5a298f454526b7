//! Prediction domain: the end-to-end pipeline and batch execution.

pub mod domain;
pub mod service;
pub mod workers;

pub use domain::PredictionResult;
pub use service::PredictionService;
pub use workers::Pool;
