use serde::{Serialize, Deserialize};

use crate::activation::activation::Softmax;
use crate::error::NetworkError;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::loss::mse::MseLoss;

/// Activation and loss pairing of the output layer, fixed when the network
/// is built.
///
/// - `Softmax`: classification; softmax over the output logits, scored
///   with cross-entropy. The combined gradient is `y_hat - indicator`.
/// - `Linear`: regression; one output neuron carrying the raw linear
///   combination, scored with squared error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStage {
    Softmax { classes: usize },
    Linear,
}

impl OutputStage {
    /// Regression always gets a single output neuron, whatever `classes` is.
    pub fn new(regression: bool, classes: usize) -> OutputStage {
        if regression {
            OutputStage::Linear
        } else {
            OutputStage::Softmax { classes }
        }
    }

    pub fn width(&self) -> usize {
        match self {
            OutputStage::Softmax { classes } => *classes,
            OutputStage::Linear => 1,
        }
    }

    pub fn is_regression(&self) -> bool {
        matches!(self, OutputStage::Linear)
    }

    /// Maps output-layer logits to the values stored on the output neurons.
    pub fn activate(&self, logits: &[f64]) -> Vec<f64> {
        match self {
            OutputStage::Softmax { .. } => Softmax::activate(logits),
            OutputStage::Linear => logits.to_vec(),
        }
    }

    /// Error term of output neuron `row` holding `output`, for one datapoint.
    pub fn delta(&self, output: f64, row: usize, target: f64) -> f64 {
        match self {
            OutputStage::Softmax { .. } => CrossEntropyLoss::gradient(output, row, target as usize),
            OutputStage::Linear => MseLoss::gradient(output, target),
        }
    }

    /// Loss of one datapoint given the forward-pass result.
    pub fn loss(&self, output: &[f64], target: f64) -> Result<f64, NetworkError> {
        match self {
            OutputStage::Softmax { classes } => CrossEntropyLoss::loss(output, class_of(target, *classes)?),
            OutputStage::Linear => Ok(MseLoss::loss(output[0], target)),
        }
    }

    /// Prediction recorded for a datapoint: the argmax class for
    /// classification, the output value for regression.
    pub fn predict(&self, output: &[f64]) -> f64 {
        match self {
            OutputStage::Softmax { .. } => argmax(output) as f64,
            OutputStage::Linear => output[0],
        }
    }
}

/// Class id named by `target` at a softmax output with `classes` rows.
/// Negative, fractional and non-finite targets are rejected.
pub fn class_of(target: f64, classes: usize) -> Result<usize, NetworkError> {
    if !(target >= 0.0 && target.fract() == 0.0) {
        return Err(NetworkError::InvalidClassTarget { target, classes });
    }
    let class = target as usize;
    if class >= classes {
        return Err(NetworkError::ClassOutOfRange { class, classes });
    }
    Ok(class)
}

/// Index of the maximum element in a slice.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
