//! Dataset domain: the historical mixes behind the descriptive charts.
//!
//! Nothing here feeds the prediction pipeline.

pub mod domain;
pub mod repo_fs;
pub mod service;

pub use domain::{
    AgeGroup, Column, CorrelationMatrix, Dataset, DatasetStats, Distribution, MixRecord,
    ScatterSeries,
};
pub use repo_fs::CsvDatasetRepo;
