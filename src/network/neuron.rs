/// Position of a neuron: `(layer, row)`, unique within a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NeuronId {
    pub layer: usize,
    pub row: usize,
}

impl NeuronId {
    pub fn new(layer: usize, row: usize) -> NeuronId {
        NeuronId { layer, row }
    }
}

/// A single neuron: trainable bias, the value written by the latest forward
/// pass, and the bias gradients gathered over the current batch.
#[derive(Debug, Clone)]
pub struct Neuron {
    id: NeuronId,
    bias: f64,
    value: f64,
    bias_gradients: Vec<f64>,
}

impl Neuron {
    /// Bias starts at zero. The value reads as `0.0` until the first forward
    /// pass overwrites it.
    pub fn new(layer: usize, row: usize) -> Neuron {
        Neuron {
            id: NeuronId::new(layer, row),
            bias: 0.0,
            value: 0.0,
            bias_gradients: Vec::new(),
        }
    }

    pub fn id(&self) -> NeuronId {
        self.id
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub(crate) fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub fn bias_gradients(&self) -> &[f64] {
        &self.bias_gradients
    }

    pub(crate) fn push_bias_gradient(&mut self, gradient: f64) {
        self.bias_gradients.push(gradient);
    }

    pub(crate) fn take_bias_gradients(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.bias_gradients)
    }
}
