//! Grading domain: strength categories, recommendations and the gauge.

pub mod bands;
pub mod classifier;
pub mod gauge;

pub use bands::{Band, BandColor, Category, StrengthBands};
pub use classifier::{classify, Recommendation, StrengthClassifier};
pub use gauge::{render, GaugeRenderer, GaugeSpec};
