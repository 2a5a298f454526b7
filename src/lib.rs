//! Concrete compressive strength prediction core.
//!
//! A mix is validated ([`mix`]), fed to a loaded regressor in fixed feature
//! order ([`model`]), and the estimate is graded into a usage tier with a
//! gauge description ([`grading`]). [`prediction::PredictionService`] wires
//! these together; [`dataset`] summarises historical mixes for display.
pub mod api;
pub mod common;
pub mod dataset;
pub mod grading;
pub mod mix;
pub mod model;
pub mod prediction;

pub use common::{Error, ErrorCode, Result};
pub use grading::{Category, GaugeSpec};
pub use mix::{MixInput, MixValues, RawMix};
pub use model::{ModelAdapter, ModelSource, Regressor};
pub use prediction::{PredictionResult, PredictionService};
