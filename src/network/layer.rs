use crate::network::neuron::Neuron;

/// An ordered, fixed-width collection of neurons sharing a layer index.
#[derive(Debug, Clone)]
pub struct Layer {
    index: usize,
    neurons: Vec<Neuron>,
}

impl Layer {
    pub fn new(index: usize, size: usize) -> Layer {
        let neurons = (0..size).map(|row| Neuron::new(index, row)).collect();
        Layer { index, neurons }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    /// Current values of every neuron, in row order.
    pub fn values(&self) -> Vec<f64> {
        self.neurons.iter().map(|n| n.value()).collect()
    }
}
