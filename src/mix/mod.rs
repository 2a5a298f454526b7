//! Mix domain: the eight quantities of a concrete mix and their validation.

pub mod domain;
pub mod service;

pub use domain::{Feature, FeatureVector, MixInput, MixValues, RawMix, FEATURE_COUNT};
pub use service::validate;
