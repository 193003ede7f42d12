use serde::{Serialize, Deserialize};

use crate::error::NetworkError;

fn default_leak() -> f64 { 0.01 }
fn default_learning_rate() -> f64 { 0.01 }
fn default_num_classes() -> usize { 2 }

/// Default momentum coefficient used by [`NetworkSpec::with_adaptive`].
pub const DEFAULT_GAMMA: f64 = 0.9;

/// A fully serializable description of a network: architecture plus the
/// hyperparameters that stay fixed once the network is built.
///
/// Only the configuration is ever written to disk, never trained weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Width of the input layer.
    pub num_features: usize,
    /// Declared number of hidden layers; must equal `neuron_counts.len()`.
    pub num_hidden_layers: usize,
    /// Width of each hidden layer, input side first.
    pub neuron_counts: Vec<usize>,
    /// Slope of the leaky ReLU for negative inputs.
    #[serde(default = "default_leak")]
    pub leak: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Output width for classification. Ignored (forced to 1) for regression.
    #[serde(default = "default_num_classes")]
    pub num_classes: usize,
    /// Momentum coefficient gamma; `None` turns momentum off.
    #[serde(default)]
    pub momentum: Option<f64>,
    /// Draw weights from N(0, sqrt(2 / fan_in)) instead of U(-1, 1).
    #[serde(default)]
    pub he_init: bool,
    #[serde(default)]
    pub regression: bool,
}

impl NetworkSpec {
    /// Classification spec with default hyperparameters; the hidden layer
    /// count is taken from `neuron_counts`.
    pub fn new(num_features: usize, neuron_counts: Vec<usize>) -> NetworkSpec {
        NetworkSpec::with_hidden_layers(num_features, neuron_counts.len(), neuron_counts)
    }

    /// Like [`NetworkSpec::new`] but with an explicit hidden layer count,
    /// checked against `neuron_counts` when the network is built.
    pub fn with_hidden_layers(
        num_features: usize,
        num_hidden_layers: usize,
        neuron_counts: Vec<usize>,
    ) -> NetworkSpec {
        NetworkSpec {
            num_features,
            num_hidden_layers,
            neuron_counts,
            leak: default_leak(),
            learning_rate: default_learning_rate(),
            num_classes: default_num_classes(),
            momentum: None,
            he_init: false,
            regression: false,
        }
    }

    pub fn with_leak(mut self, leak: f64) -> Self {
        self.leak = leak;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    pub fn with_momentum(mut self, gamma: f64) -> Self {
        self.momentum = Some(gamma);
        self
    }

    /// Momentum with the default gamma of 0.9.
    pub fn with_adaptive(self) -> Self {
        self.with_momentum(DEFAULT_GAMMA)
    }

    pub fn with_he_init(mut self) -> Self {
        self.he_init = true;
        self
    }

    pub fn as_regression(mut self) -> Self {
        self.regression = true;
        self
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<(), NetworkError> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec, NetworkError> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
