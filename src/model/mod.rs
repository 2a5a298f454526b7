//! Model domain: loading a trained regressor and invoking it in feature order.

pub mod adapter;
pub mod artifact;
pub mod domain;
pub mod repo_fs;

pub use adapter::ModelAdapter;
pub use domain::{ModelInfo, ModelKind, ModelSource, Regressor};
