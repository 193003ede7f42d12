use crate::error::NetworkError;
use crate::network::neuron::NeuronId;

/// Position of an edge: the left neuron's layer and row, and the row of the
/// right neuron in the next layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId {
    pub left_layer: usize,
    pub left_row: usize,
    pub right_row: usize,
}

impl EdgeId {
    pub fn new(left_layer: usize, left_row: usize, right_row: usize) -> EdgeId {
        EdgeId { left_layer, left_row, right_row }
    }

    pub fn left(&self) -> NeuronId {
        NeuronId::new(self.left_layer, self.left_row)
    }

    pub fn right(&self) -> NeuronId {
        NeuronId::new(self.left_layer + 1, self.right_row)
    }
}

/// A weighted connection between two neurons in adjacent layers.
///
/// The edge only records the endpoints' ids; the neurons themselves live in
/// the network's layers.
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    weight: f64,
    velocity: f64,
    /// Error term of the right neuron for the datapoint being backpropagated.
    delta: f64,
    loss_gradients: Vec<f64>,
}

impl Edge {
    /// Fails unless `right` sits in the layer directly after `left`.
    pub fn new(left: NeuronId, right: NeuronId, weight: f64) -> Result<Edge, NetworkError> {
        if left.layer + 1 != right.layer {
            return Err(NetworkError::NonAdjacentLayers {
                left: left.layer,
                right: right.layer,
            });
        }
        Ok(Edge {
            id: EdgeId::new(left.layer, left.row, right.row),
            weight,
            velocity: 0.0,
            delta: 0.0,
            loss_gradients: Vec::new(),
        })
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn left(&self) -> NeuronId {
        self.id.left()
    }

    pub fn right(&self) -> NeuronId {
        self.id.right()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub(crate) fn set_delta(&mut self, delta: f64) {
        self.delta = delta;
    }

    pub fn loss_gradients(&self) -> &[f64] {
        &self.loss_gradients
    }

    pub(crate) fn push_loss_gradient(&mut self, gradient: f64) {
        self.loss_gradients.push(gradient);
    }

    pub(crate) fn take_loss_gradients(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.loss_gradients)
    }
}
