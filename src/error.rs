use thiserror::Error;

use crate::network::edge::EdgeId;

/// Errors raised while building or driving a [`Network`](crate::network::Network).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("neuron_counts ({neuron_counts}) must have a length equal to num_hidden_layers ({hidden_layers})")]
    NeuronCountMismatch {
        hidden_layers: usize,
        neuron_counts: usize,
    },

    #[error("layer {layer} must contain at least one neuron")]
    EmptyLayer { layer: usize },

    #[error("edge must connect adjacent layers (left: {left}, right: {right})")]
    NonAdjacentLayers { left: usize, right: usize },

    #[error("number of features must match the number of neurons in the input layer ({got} != {expected})")]
    InputSizeMismatch { expected: usize, got: usize },

    /// Gradients must be stored edge by edge in the order given by
    /// `Network::backward_order`.
    #[error("gradient stored out of backward order (expected edge {expected:?}, got {got:?})")]
    GradientOutOfOrder { expected: EdgeId, got: EdgeId },

    #[error("edge {edge:?} must be stored with first = {expected}")]
    FirstEdgeMismatch { edge: EdgeId, expected: bool },

    #[error("no forward pass has been run for this datapoint")]
    NoForwardPass,

    #[error("softmax value should be between 0 and 1 (y_hat[{class}] = {value})")]
    InvalidProbability { class: usize, value: f64 },

    #[error("class {class} is not an output of the network ({classes} classes)")]
    ClassOutOfRange { class: usize, classes: usize },

    #[error("target {target} is not a class id of a network with {classes} classes")]
    InvalidClassTarget { target: f64, classes: usize },

    #[error("invalid weight initialisation: {0}")]
    InvalidInitialisation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when constructing batch partitioners.
#[derive(Debug, Error, PartialEq)]
pub enum PartitionError {
    #[error("n ({n}) and m ({m}) must be positive integers")]
    NonPositive { n: usize, m: usize },

    #[error("m ({m}) cannot be greater than n ({n})")]
    BatchTooLarge { m: usize, n: usize },

    #[error("n must equal the number of labels (n = {n}, labels = {labels})")]
    LabelCountMismatch { n: usize, labels: usize },

    #[error("label {label} at index {index} is not a non-negative integer class")]
    InvalidClassLabel { index: usize, label: f64 },

    #[error("num_bins must be at least 1")]
    NoBins,
}

/// Errors raised by the training, validation and testing loops.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("number of features must match number of initial neurons (features = {features}, initial neurons = {inputs})")]
    FeatureCountMismatch { features: usize, inputs: usize },

    #[error("features ({features}) and targets ({targets}) must have equal length")]
    LengthMismatch { features: usize, targets: usize },

    #[error("dataset must contain at least one datapoint")]
    EmptyDataset,

    #[error("datapoint {row} has {got} features, expected {expected}")]
    RaggedFeatures { row: usize, expected: usize, got: usize },

    #[error("target {target} at index {index} is not a class of a network with {outputs} outputs")]
    InvalidTarget { index: usize, target: f64, outputs: usize },

    #[error("the number of output neurons in the network ({outputs}) is less than the number of classes in the data ({classes})")]
    TooFewOutputs { outputs: usize, classes: usize },

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Partition(#[from] PartitionError),
}
