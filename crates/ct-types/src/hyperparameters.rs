//! Classifier hyperparameters and the values a tuner assigns to them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::errors::{HtError, HtResult};
use crate::validation_error;

/// Display name of the tuned model.
pub const MODEL_NAME: &str = "Catboost Classifier";

/// A concrete hyperparameter value, as produced by a tuner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
}

impl ParameterValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(v) => *v as f64,
            Self::Float(v) => *v,
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
        }
    }
}

/// Hyperparameters of the gradient-boosted tree classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierHyperparameters {
    /// The gradient step.
    pub learning_rate: f64,
    /// Maximum number of trees that can be built.
    pub iterations: i64,
    /// Depth of each tree.
    pub depth: i64,
    /// Coefficient at the L2 regularization term of the cost function.
    pub l2_leaf_reg: f64,
}

impl Default for ClassifierHyperparameters {
    fn default() -> Self {
        Self {
            learning_rate: 1e-1,
            iterations: 100,
            depth: 6,
            l2_leaf_reg: 3.0,
        }
    }
}

impl ClassifierHyperparameters {
    /// Apply a sampled assignment on top of `self`.
    ///
    /// Names the classifier does not know are skipped, so an assignment drawn
    /// from a wider search space can be passed through unchanged.
    pub fn with_overrides(mut self, assignment: &HashMap<String, ParameterValue>) -> HtResult<Self> {
        for (name, value) in assignment {
            match name.as_str() {
                "learning_rate" => self.learning_rate = value.as_f64(),
                "l2_leaf_reg" => self.l2_leaf_reg = value.as_f64(),
                "iterations" => self.iterations = integral(name, value)?,
                "depth" => self.depth = integral(name, value)?,
                other => debug!("Ignoring unknown hyperparameter: {}", other),
            }
        }
        Ok(self)
    }

    /// The current values keyed by hyperparameter name.
    pub fn to_assignment(&self) -> HashMap<String, ParameterValue> {
        HashMap::from([
            ("learning_rate".to_string(), ParameterValue::Float(self.learning_rate)),
            ("iterations".to_string(), ParameterValue::Int(self.iterations)),
            ("depth".to_string(), ParameterValue::Int(self.depth)),
            ("l2_leaf_reg".to_string(), ParameterValue::Float(self.l2_leaf_reg)),
        ])
    }
}

fn integral(name: &str, value: &ParameterValue) -> HtResult<i64> {
    match *value {
        ParameterValue::Int(v) => Ok(v),
        ParameterValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        ParameterValue::Float(v) => Err(validation_error!(
            "hyperparameter {} expects an integer, got {}",
            name,
            v
        )),
    }
}

impl std::fmt::Display for ClassifierHyperparameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // alphabetical; reals keep their trailing `.0`
        write!(
            f,
            "Model name: {MODEL_NAME} (depth: {}, iterations: {}, l2_leaf_reg: {:?}, learning_rate: {:?})",
            self.depth, self.iterations, self.l2_leaf_reg, self.learning_rate
        )
    }
}

impl TryFrom<&HashMap<String, ParameterValue>> for ClassifierHyperparameters {
    type Error = HtError;

    fn try_from(assignment: &HashMap<String, ParameterValue>) -> HtResult<Self> {
        Self::default().with_overrides(assignment)
    }
}
