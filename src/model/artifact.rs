//! JSON model artifacts and the regressors they deserialise into.
//!
//! An artifact declares its feature list, which must match the mix feature
//! order exactly, and one of two model families:
//!
//! * `linear`: `intercept + Σ coefficients[i] * x[i]`
//! * `tree_ensemble`: regression trees combined by sum (gradient boosting)
//!   or mean (random forest), scaled by `learning_rate` and offset by
//!   `base_score`.

use serde::{Deserialize, Serialize};

use crate::common::error::{ModelLoadError, PredictionError};
use crate::mix::domain::{Feature, FeatureVector, FEATURE_COUNT};

use super::domain::{ModelKind, Regressor};

/// Top-level artifact document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub features: Vec<String>,
    pub model: ModelSpec,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelLoadError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Check structure and hand back a ready regressor.
    pub fn into_regressor(self) -> Result<Box<dyn Regressor>, ModelLoadError> {
        check_feature_order(&self.features)?;
        match self.model {
            ModelSpec::Linear(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
            ModelSpec::TreeEnsemble(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}

fn check_feature_order(features: &[String]) -> Result<(), ModelLoadError> {
    if features.len() != FEATURE_COUNT {
        return Err(ModelLoadError::Arity {
            expected: FEATURE_COUNT,
            found: features.len(),
        });
    }
    for (position, (found, expected)) in features.iter().zip(Feature::ALL).enumerate() {
        if Feature::from_name(found) != Some(expected) {
            return Err(ModelLoadError::FeatureOrder {
                position,
                expected: expected.column(),
                found: found.clone(),
            });
        }
    }
    Ok(())
}

/// Ordinary linear regression.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    fn validate(&self) -> Result<(), ModelLoadError> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ModelLoadError::Arity {
                expected: FEATURE_COUNT,
                found: self.coefficients.len(),
            });
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelLoadError::Invalid(
                "linear parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl Regressor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features.as_slice())
            .map(|(c, x)| c * x)
            .sum();
        Ok(self.intercept + dot)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Linear
    }
}

/// How per-tree outputs are combined.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Sum,
    Mean,
}

/// One node of a flattened regression tree. Node 0 is the root.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Leaf {
        leaf: f64,
    },
    /// `x[feature] <= threshold` goes left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn validate(&self, tree: usize) -> Result<(), ModelLoadError> {
        let invalid = |msg: String| ModelLoadError::Invalid(format!("tree {tree}: {msg}"));
        if self.nodes.is_empty() {
            return Err(invalid("no nodes".to_string()));
        }
        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Leaf { leaf } if !leaf.is_finite() => {
                    return Err(invalid(format!("node {idx} has a non-finite leaf")));
                }
                Node::Leaf { .. } => {}
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(invalid(format!("node {idx} splits on unknown feature {feature}")));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {idx} has a non-finite threshold")));
                    }
                    // Forward-only children rule out cycles.
                    for child in [left, right] {
                        if child <= idx || child >= len {
                            return Err(invalid(format!("node {idx} has bad child {child}")));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { leaf } => return leaf,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if x[feature] <= threshold { left } else { right },
            }
        }
    }
}

/// Gradient boosted or bagged regression trees.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    pub aggregation: Aggregation,
    pub trees: Vec<Tree>,
}

fn default_learning_rate() -> f64 {
    1.0
}

impl TreeEnsemble {
    fn validate(&self) -> Result<(), ModelLoadError> {
        if self.trees.is_empty() {
            return Err(ModelLoadError::Invalid("ensemble has no trees".to_string()));
        }
        if !self.base_score.is_finite() || !self.learning_rate.is_finite() {
            return Err(ModelLoadError::Invalid(
                "ensemble parameters must be finite".to_string(),
            ));
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| tree.validate(i))
    }
}

impl Regressor for TreeEnsemble {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        let x = features.as_slice();
        let total: f64 = self.trees.iter().map(|t| t.evaluate(x)).sum();
        let combined = match self.aggregation {
            Aggregation::Sum => total,
            Aggregation::Mean => total / self.trees.len() as f64,
        };
        Ok(self.base_score + self.learning_rate * combined)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::TreeEnsemble
    }
}
