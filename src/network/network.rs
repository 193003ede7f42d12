use log::debug;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Normal;

use crate::activation::activation::{transfer, LeakyRelu};
use crate::error::NetworkError;
use crate::loss::output_stage::{class_of, OutputStage};
use crate::network::backward::BackwardOrder;
use crate::network::edge::{Edge, EdgeId};
use crate::network::layer::Layer;
use crate::network::neuron::{Neuron, NeuronId};
use crate::network::spec::NetworkSpec;

/// Progress of the backward sweep for the datapoint last forwarded.
#[derive(Debug, Clone)]
enum Sweep {
    /// No datapoint is waiting for gradients.
    Idle,
    /// `next` is the only edge (and first-edge flag) accepted next; `rest`
    /// yields the ones after it.
    Backward { next: (EdgeId, bool), rest: BackwardOrder },
}

impl Sweep {
    fn start(mut order: BackwardOrder) -> Sweep {
        match order.next() {
            Some(next) => Sweep::Backward { next, rest: order },
            None => Sweep::Idle,
        }
    }
}

/// A fully connected feed-forward network of explicit neurons and edges.
///
/// Layer `0` is the input layer and the last layer is the output layer.
/// Edges are stored as `edges[left_layer][right_row][left_row]`, so every
/// edge into or out of a neuron is reachable by direct indexing.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
    edges: Vec<Vec<Vec<Edge>>>,
    relu: LeakyRelu,
    output: OutputStage,
    learning_rate: f64,
    momentum: Option<f64>,
    sweep: Sweep,
}

impl Network {
    /// Builds a network from `spec`, drawing initial weights from `rng`.
    ///
    /// Every weight is first drawn from U(-1, 1); with `he_init` it is then
    /// redrawn from N(0, sqrt(2 / fan_in)), where fan_in is the width of the
    /// edge's left layer.
    pub fn new<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network, NetworkError> {
        if spec.num_hidden_layers != spec.neuron_counts.len() {
            return Err(NetworkError::NeuronCountMismatch {
                hidden_layers: spec.num_hidden_layers,
                neuron_counts: spec.neuron_counts.len(),
            });
        }

        let output = OutputStage::new(spec.regression, spec.num_classes);
        let widths: Vec<usize> = std::iter::once(spec.num_features)
            .chain(spec.neuron_counts.iter().copied())
            .chain(std::iter::once(output.width()))
            .collect();
        if let Some(layer) = widths.iter().position(|&w| w == 0) {
            return Err(NetworkError::EmptyLayer { layer });
        }

        let layers: Vec<Layer> = widths.iter()
            .enumerate()
            .map(|(index, &size)| Layer::new(index, size))
            .collect();

        let uniform = Uniform::new(-1.0, 1.0);
        let mut edges = Vec::with_capacity(layers.len() - 1);
        for pair in layers.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            let he = if spec.he_init {
                let std_dev = (2.0 / left.len() as f64).sqrt();
                let normal = Normal::new(0.0, std_dev)
                    .map_err(|e| NetworkError::InvalidInitialisation(e.to_string()))?;
                Some(normal)
            } else {
                None
            };

            let mut layer_edges = Vec::with_capacity(right.len());
            for right_neuron in right.neurons() {
                let mut row_edges = Vec::with_capacity(left.len());
                for left_neuron in left.neurons() {
                    let mut weight = uniform.sample(rng);
                    if let Some(normal) = &he {
                        weight = normal.sample(rng);
                    }
                    row_edges.push(Edge::new(left_neuron.id(), right_neuron.id(), weight)?);
                }
                layer_edges.push(row_edges);
            }
            edges.push(layer_edges);
        }

        let network = Network {
            layers,
            edges,
            relu: LeakyRelu::new(spec.leak),
            output,
            learning_rate: spec.learning_rate,
            momentum: spec.momentum,
            sweep: Sweep::Idle,
        };
        debug!(
            "built network: widths={:?} edges={} output={:?} he_init={} momentum={:?}",
            widths,
            network.edge_count(),
            network.output,
            spec.he_init,
            network.momentum,
        );
        Ok(network)
    }

    /// Builds a network seeded from the thread-local generator.
    pub fn from_spec(spec: &NetworkSpec) -> Result<Network, NetworkError> {
        Network::new(spec, &mut rand::thread_rng())
    }

    // -----------------------------------------------------------------------
    // Forward pass
    // -----------------------------------------------------------------------

    /// Propagates one datapoint through the network.
    ///
    /// Hidden layers apply leaky ReLU to the linear combination of the
    /// previous layer. The output layer either applies softmax once over all
    /// logits (classification) or keeps the single linear value
    /// (regression). Returns the output neurons' values.
    ///
    /// The input length is checked before any neuron is written.
    pub fn forward_pass(&mut self, x: &[f64]) -> Result<Vec<f64>, NetworkError> {
        let input_width = self.layers[0].len();
        if x.len() != input_width {
            return Err(NetworkError::InputSizeMismatch { expected: input_width, got: x.len() });
        }

        for (neuron, &value) in self.layers[0].neurons_mut().iter_mut().zip(x) {
            neuron.set_value(value);
        }

        let output_index = self.layers.len() - 1;
        for left in 0..output_index {
            let right = left + 1;
            let values = self.layers[left].values();
            let logits: Vec<f64> = self.edges[left].iter()
                .zip(self.layers[right].neurons())
                .map(|(row_edges, neuron)| {
                    let weights: Vec<f64> = row_edges.iter().map(|e| e.weight()).collect();
                    transfer(&values, &weights, neuron.bias())
                })
                .collect();

            let activated = if right == output_index {
                self.output.activate(&logits)
            } else {
                logits.iter().map(|&z| self.relu.function(z)).collect()
            };
            for (neuron, value) in self.layers[right].neurons_mut().iter_mut().zip(&activated) {
                neuron.set_value(*value);
            }
        }

        self.sweep = Sweep::start(self.backward_order());
        Ok(self.layers[output_index].values())
    }

    // -----------------------------------------------------------------------
    // Gradient storage
    // -----------------------------------------------------------------------

    /// Edges in the order [`Network::store_gradient_of_loss`] must receive
    /// them for one datapoint.
    pub fn backward_order(&self) -> BackwardOrder {
        BackwardOrder::new(self.neuron_counts())
    }

    /// Stores every edge and bias gradient for the datapoint last passed to
    /// [`Network::forward_pass`], walking [`Network::backward_order`].
    pub fn store_gradients(&mut self, target: f64) -> Result<(), NetworkError> {
        for (edge, first) in self.backward_order() {
            self.store_gradient_of_loss(edge, target, first)?;
        }
        Ok(())
    }

    /// Appends d(loss)/d(weight) for `edge` to its gradient list and, when
    /// `first` is set, d(loss)/d(bias) of its right neuron.
    ///
    /// The right neuron's error term is
    /// - `y_hat - indicator(row == target)` at a softmax output,
    /// - `2 (y_hat - target)` at a linear output,
    /// - `sum(w * delta over the neuron's outgoing edges) * relu'(value)` in
    ///   a hidden layer.
    ///
    /// It is cached on the edge for the layer before. Edges must arrive one
    /// by one in exactly [`Network::backward_order`] with its `first` flags
    /// after a forward pass, else `GradientOutOfOrder`, `FirstEdgeMismatch`
    /// or `NoForwardPass` is returned. A softmax target must be an integer
    /// class id.
    ///
    /// # Panics
    /// Panics if `edge` does not belong to this network.
    pub fn store_gradient_of_loss(
        &mut self,
        edge: EdgeId,
        target: f64,
        first: bool,
    ) -> Result<(), NetworkError> {
        let right = edge.right();
        let output_index = self.layers.len() - 1;

        if right.layer == output_index {
            if let OutputStage::Softmax { classes } = self.output {
                class_of(target, classes)?;
            }
        }
        self.advance_sweep(edge, first)?;

        let o_left = self.neuron(edge.left()).value();
        let o_right = self.neuron(right).value();

        let delta = if right.layer == output_index {
            self.output.delta(o_right, right.row, target)
        } else {
            // Outgoing edges of the right neuron: edges[right.layer][j][right.row].
            let factor: f64 = self.edges[right.layer].iter()
                .map(|row_edges| {
                    let next = &row_edges[right.row];
                    next.weight() * next.delta()
                })
                .sum();
            factor * self.relu.derivative(o_right)
        };

        let stored = self.edge_mut(edge);
        stored.set_delta(delta);
        stored.push_loss_gradient(o_left * delta);
        if first {
            self.neuron_mut(right).push_bias_gradient(delta);
        }
        Ok(())
    }

    fn advance_sweep(&mut self, edge: EdgeId, first: bool) -> Result<(), NetworkError> {
        let (expected, expected_first) = match &self.sweep {
            Sweep::Idle => return Err(NetworkError::NoForwardPass),
            Sweep::Backward { next, .. } => *next,
        };
        if edge != expected {
            return Err(NetworkError::GradientOutOfOrder { expected, got: edge });
        }
        if first != expected_first {
            return Err(NetworkError::FirstEdgeMismatch { edge, expected: expected_first });
        }

        self.sweep = match std::mem::replace(&mut self.sweep, Sweep::Idle) {
            Sweep::Backward { rest, .. } => Sweep::start(rest),
            Sweep::Idle => Sweep::Idle,
        };
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Parameter updates
    // -----------------------------------------------------------------------

    /// Applies the batch-averaged gradient to `edge`'s weight and clears its
    /// gradient list.
    ///
    /// Without momentum: `w -= lr * avg`. With momentum gamma:
    /// `v = gamma * v + lr * avg; w -= v`.
    ///
    /// The edge must have received at least one gradient since the last
    /// update; an empty list averages to NaN.
    pub fn back_propagate_weight(&mut self, edge: EdgeId) {
        let learning_rate = self.learning_rate;
        let momentum = self.momentum;
        let edge = self.edge_mut(edge);
        let avg = mean(&edge.take_loss_gradients());
        match momentum {
            Some(gamma) => {
                let velocity = gamma * edge.velocity() + learning_rate * avg;
                edge.set_weight(edge.weight() - velocity);
                edge.set_velocity(velocity);
            }
            None => edge.set_weight(edge.weight() - learning_rate * avg),
        }
    }

    /// Applies the batch-averaged bias gradient to `neuron` and clears it.
    /// Same precondition as [`Network::back_propagate_weight`].
    pub fn back_propagate_bias(&mut self, neuron: NeuronId) {
        let learning_rate = self.learning_rate;
        let neuron = self.neuron_mut(neuron);
        let avg = mean(&neuron.take_bias_gradients());
        neuron.set_bias(neuron.bias() - learning_rate * avg);
    }

    /// Updates every edge weight, output boundary first.
    pub fn back_propagate_weights(&mut self) {
        for (edge, _) in self.backward_order() {
            self.back_propagate_weight(edge);
        }
    }

    /// Updates the bias of every neuron outside the input layer.
    pub fn back_propagate_biases(&mut self) {
        let ids: Vec<NeuronId> = self.layers[1..].iter()
            .flat_map(|layer| layer.neurons().iter().map(|n| n.id()))
            .collect();
        for id in ids {
            self.back_propagate_bias(id);
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn edges(&self) -> &[Vec<Vec<Edge>>] {
        &self.edges
    }

    /// Width of every layer, input first, output last.
    pub fn neuron_counts(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.len()).collect()
    }

    pub fn is_regressor(&self) -> bool {
        self.output.is_regression()
    }

    pub fn output_stage(&self) -> OutputStage {
        self.output
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn momentum(&self) -> Option<f64> {
        self.momentum
    }

    pub fn leak(&self) -> f64 {
        self.relu.leak
    }

    pub fn edge_count(&self) -> usize {
        (0..self.edges.len()).map(|l| self.edges_in_layer(l)).sum()
    }

    /// # Panics
    /// Panics if `id` does not belong to this network.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.left_layer][id.right_row][id.left_row]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.left_layer][id.right_row][id.left_row]
    }

    /// # Panics
    /// Panics if `id` does not belong to this network.
    pub fn neuron(&self, id: NeuronId) -> &Neuron {
        &self.layers[id.layer].neurons()[id.row]
    }

    pub fn neuron_mut(&mut self, id: NeuronId) -> &mut Neuron {
        &mut self.layers[id.layer].neurons_mut()[id.row]
    }

    fn edges_in_layer(&self, left_layer: usize) -> usize {
        self.layers[left_layer].len() * self.layers[left_layer + 1].len()
    }
}

fn mean(values: &[f64]) -> f64 {
    debug_assert!(!values.is_empty(), "parameter update with no stored gradients");
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn build(spec: &NetworkSpec, seed: u64) -> Network {
        Network::new(spec, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    /// Regression chain 1 -> 1 -> 1 with hand-set weights.
    fn chain(w1: f64, w2: f64) -> Network {
        let spec = NetworkSpec::new(1, vec![1]).as_regression();
        let mut network = build(&spec, 0);
        network.edge_mut(EdgeId::new(0, 0, 0)).set_weight(w1);
        network.edge_mut(EdgeId::new(1, 0, 0)).set_weight(w2);
        network
    }

    #[test]
    fn builds_input_hidden_and_output_layers() {
        let network = build(&NetworkSpec::new(3, vec![4, 5]).with_classes(3), 1);
        assert_eq!(network.neuron_counts(), vec![3, 4, 5, 3]);
        assert_eq!(network.edges().len(), 3);
        assert_eq!(network.edge_count(), 3 * 4 + 4 * 5 + 5 * 3);
        for (index, layer) in network.layers().iter().enumerate() {
            assert_eq!(layer.index(), index);
        }
    }

    #[test]
    fn edges_are_indexed_by_layer_right_row_left_row() {
        let network = build(&NetworkSpec::new(2, vec![3]), 2);
        for (l, layer_edges) in network.edges().iter().enumerate() {
            for (j, row_edges) in layer_edges.iter().enumerate() {
                for (i, edge) in row_edges.iter().enumerate() {
                    assert_eq!(edge.id(), EdgeId::new(l, i, j));
                }
            }
        }
    }

    #[test]
    fn mismatched_neuron_counts_fail() {
        let spec = NetworkSpec::with_hidden_layers(2, 3, vec![4, 4]);
        let err = Network::new(&spec, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, NetworkError::NeuronCountMismatch { hidden_layers: 3, neuron_counts: 2 }));
        let message = err.to_string();
        assert!(message.contains('3') && message.contains('2'));
    }

    #[test]
    fn zero_width_layer_fails() {
        let err = Network::new(&NetworkSpec::new(2, vec![0]), &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, NetworkError::EmptyLayer { layer: 1 }));
    }

    #[test]
    fn regression_forces_single_output() {
        let network = build(&NetworkSpec::new(2, vec![3]).with_classes(5).as_regression(), 3);
        assert!(network.is_regressor());
        assert_eq!(network.neuron_counts(), vec![2, 3, 1]);
    }

    #[test]
    fn uniform_weights_lie_in_unit_interval() {
        let network = build(&NetworkSpec::new(4, vec![8, 8]), 4);
        for layer in network.edges() {
            for row in layer {
                assert!(row.iter().all(|e| (-1.0..1.0).contains(&e.weight())));
            }
        }
    }

    #[test]
    fn same_seed_gives_same_weights() {
        let spec = NetworkSpec::new(3, vec![4]).with_he_init();
        let a = build(&spec, 42);
        let b = build(&spec, 42);
        let weights = |n: &Network| -> Vec<f64> {
            n.edges().iter().flatten().flatten().map(|e| e.weight()).collect()
        };
        assert_eq!(weights(&a), weights(&b));
        assert_ne!(weights(&a), weights(&build(&spec, 43)));
    }

    #[test]
    fn he_weights_scale_with_fan_in() {
        let network = build(&NetworkSpec::new(200, vec![50]).with_he_init(), 5);
        let first: Vec<f64> = network.edges()[0].iter().flatten().map(|e| e.weight()).collect();
        let variance = first.iter().map(|w| w * w).sum::<f64>() / first.len() as f64;
        // Expected variance 2 / 200.
        assert_relative_eq!(variance, 0.01, max_relative = 0.1);
    }

    #[test]
    fn classification_output_is_a_distribution() {
        let mut network = build(&NetworkSpec::new(3, vec![5, 4]).with_classes(4), 6);
        let out = network.forward_pass(&[0.3, -1.2, 2.5]).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_abs_diff_eq!(out.iter().sum::<f64>(), 1.0, epsilon = 1e-8);
        assert_eq!(network.layers()[3].values(), out);
    }

    #[test]
    fn regression_output_is_linear_combination() {
        let mut network = chain(2.0, -3.0);
        network.neuron_mut(NeuronId::new(2, 0)).set_bias(0.5);
        let out = network.forward_pass(&[1.5]).unwrap();
        // hidden = relu(2 * 1.5) = 3, output = -3 * 3 + 0.5
        assert_eq!(out.len(), 1);
        assert_abs_diff_eq!(out[0], -8.5, epsilon = 1e-12);
    }

    #[test]
    fn hidden_layer_applies_leak() {
        let mut network = chain(-2.0, 1.0);
        let out = network.forward_pass(&[1.0]).unwrap();
        assert_abs_diff_eq!(network.neuron(NeuronId::new(1, 0)).value(), -0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(out[0], -0.02, epsilon = 1e-12);
    }

    #[test]
    fn wrong_input_width_fails_without_mutation() {
        let mut network = build(&NetworkSpec::new(2, vec![3]), 7);
        network.forward_pass(&[0.5, 0.25]).unwrap();
        let before: Vec<Vec<f64>> = network.layers().iter().map(|l| l.values()).collect();

        let err = network.forward_pass(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, NetworkError::InputSizeMismatch { expected: 2, got: 3 }));
        let after: Vec<Vec<f64>> = network.layers().iter().map(|l| l.values()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn regression_gradients_match_hand_derivation() {
        let mut network = chain(0.5, 2.0);
        network.forward_pass(&[2.0]).unwrap();
        network.store_gradients(1.0).unwrap();

        // hidden = 1, output = 2, delta_out = 2 * (2 - 1) = 2
        let out_edge = network.edge(EdgeId::new(1, 0, 0));
        assert_abs_diff_eq!(out_edge.delta(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out_edge.loss_gradients()[0], 2.0, epsilon = 1e-12);
        // delta_hidden = 2 * 2 * relu'(1) = 4, grad = x * 4
        let in_edge = network.edge(EdgeId::new(0, 0, 0));
        assert_abs_diff_eq!(in_edge.loss_gradients()[0], 8.0, epsilon = 1e-12);
        assert_eq!(network.neuron(NeuronId::new(2, 0)).bias_gradients(), &[2.0]);
        assert_eq!(network.neuron(NeuronId::new(1, 0)).bias_gradients(), &[4.0]);
    }

    #[test]
    fn hidden_gradient_uses_leak_for_negative_values() {
        let mut network = chain(-1.0, 3.0);
        network.forward_pass(&[1.0]).unwrap();
        network.store_gradients(0.0).unwrap();
        // hidden = -0.01, output = -0.03, delta_out = -0.06
        // delta_hidden = 3 * -0.06 * 0.01
        let in_edge = network.edge(EdgeId::new(0, 0, 0));
        assert_abs_diff_eq!(in_edge.delta(), -0.0018, epsilon = 1e-12);
    }

    #[test]
    fn bias_gradient_stored_once_per_right_neuron() {
        let mut network = build(&NetworkSpec::new(3, vec![2]).with_classes(2), 8);
        network.forward_pass(&[1.0, 0.0, -1.0]).unwrap();
        network.store_gradients(1.0).unwrap();
        for layer in &network.layers()[1..] {
            assert!(layer.neurons().iter().all(|n| n.bias_gradients().len() == 1));
        }
        assert!(network.layers()[0].neurons().iter().all(|n| n.bias_gradients().is_empty()));
    }

    #[test]
    fn classification_gradients_match_finite_differences() {
        let spec = NetworkSpec::new(2, vec![4]).with_classes(3);
        let mut network = build(&spec, 9);
        let x = [0.7, -0.4];
        let target = 2.0;
        network.forward_pass(&x).unwrap();
        network.store_gradients(target).unwrap();

        let ids: Vec<EdgeId> = network.backward_order().map(|(e, _)| e).collect();
        let eps = 1e-6;
        for id in ids {
            let analytic = network.edge(id).loss_gradients()[0];
            let weight = network.edge(id).weight();

            network.edge_mut(id).set_weight(weight + eps);
            let plus = network.forward_pass(&x).unwrap();
            network.edge_mut(id).set_weight(weight - eps);
            let minus = network.forward_pass(&x).unwrap();
            network.edge_mut(id).set_weight(weight);

            let stage = network.output_stage();
            let numeric = (stage.loss(&plus, target).unwrap() - stage.loss(&minus, target).unwrap())
                / (2.0 * eps);
            assert_abs_diff_eq!(analytic, numeric, epsilon = 1e-5);
        }
    }

    #[test]
    fn storing_before_forward_pass_fails() {
        let mut network = build(&NetworkSpec::new(2, vec![2]), 10);
        let err = network.store_gradient_of_loss(EdgeId::new(1, 0, 0), 0.0, true).unwrap_err();
        assert!(matches!(err, NetworkError::NoForwardPass));
    }

    #[test]
    fn storing_hidden_edges_first_fails() {
        let mut network = build(&NetworkSpec::new(2, vec![2]), 11);
        network.forward_pass(&[1.0, 1.0]).unwrap();
        let err = network.store_gradient_of_loss(EdgeId::new(0, 0, 0), 0.0, true).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::GradientOutOfOrder { expected, got }
                if expected == EdgeId::new(1, 0, 0) && got == EdgeId::new(0, 0, 0)
        ));
    }

    #[test]
    fn advancing_before_layer_is_complete_fails() {
        let mut network = build(&NetworkSpec::new(2, vec![2]), 12);
        network.forward_pass(&[1.0, 1.0]).unwrap();
        network.store_gradient_of_loss(EdgeId::new(1, 0, 0), 0.0, true).unwrap();
        let err = network.store_gradient_of_loss(EdgeId::new(0, 0, 0), 0.0, true).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::GradientOutOfOrder { expected, .. } if expected == EdgeId::new(1, 1, 0)
        ));
    }

    #[test]
    fn repeated_edge_is_rejected() {
        // 1 -> 1 -> 2: storing the first output edge twice would skip its
        // sibling and count the output bias twice.
        let mut network = build(&NetworkSpec::new(1, vec![1]).with_classes(2), 15);
        network.forward_pass(&[0.7]).unwrap();
        network.store_gradient_of_loss(EdgeId::new(1, 0, 0), 1.0, true).unwrap();
        let err = network.store_gradient_of_loss(EdgeId::new(1, 0, 0), 1.0, true).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::GradientOutOfOrder { expected, got }
                if expected == EdgeId::new(1, 0, 1) && got == EdgeId::new(1, 0, 0)
        ));
        assert_eq!(network.edge(EdgeId::new(1, 0, 0)).loss_gradients().len(), 1);
        assert_eq!(network.neuron(NeuronId::new(2, 0)).bias_gradients().len(), 1);

        let err = network.store_gradient_of_loss(EdgeId::new(0, 0, 0), 1.0, true).unwrap_err();
        assert!(matches!(err, NetworkError::GradientOutOfOrder { .. }));

        network.store_gradient_of_loss(EdgeId::new(1, 0, 1), 1.0, true).unwrap();
        network.store_gradient_of_loss(EdgeId::new(0, 0, 0), 1.0, true).unwrap();
        let err = network.store_gradient_of_loss(EdgeId::new(0, 0, 0), 1.0, true).unwrap_err();
        assert!(matches!(err, NetworkError::NoForwardPass));
    }

    #[test]
    fn first_flag_must_match_backward_order() {
        let mut network = build(&NetworkSpec::new(2, vec![1]), 16);
        network.forward_pass(&[1.0, 0.5]).unwrap();
        let err = network.store_gradient_of_loss(EdgeId::new(1, 0, 0), 0.0, false).unwrap_err();
        assert!(matches!(err, NetworkError::FirstEdgeMismatch { expected: true, .. }));

        network.store_gradient_of_loss(EdgeId::new(1, 0, 0), 0.0, true).unwrap();
        network.store_gradient_of_loss(EdgeId::new(1, 0, 1), 0.0, true).unwrap();
        network.store_gradient_of_loss(EdgeId::new(0, 0, 0), 0.0, true).unwrap();
        let err = network.store_gradient_of_loss(EdgeId::new(0, 1, 0), 0.0, true).unwrap_err();
        assert!(matches!(err, NetworkError::FirstEdgeMismatch { expected: false, .. }));
        assert_eq!(network.neuron(NeuronId::new(1, 0)).bias_gradients().len(), 1);
    }

    #[test]
    fn completed_sweep_needs_new_forward_pass() {
        let mut network = build(&NetworkSpec::new(2, vec![2]), 13);
        network.forward_pass(&[1.0, 1.0]).unwrap();
        network.store_gradients(0.0).unwrap();
        let err = network.store_gradients(0.0).unwrap_err();
        assert!(matches!(err, NetworkError::NoForwardPass));

        network.forward_pass(&[0.0, 1.0]).unwrap();
        network.store_gradients(1.0).unwrap();
        assert_eq!(network.edge(EdgeId::new(0, 0, 0)).loss_gradients().len(), 2);
    }

    #[test]
    fn classification_target_outside_outputs_fails() {
        let mut network = build(&NetworkSpec::new(2, vec![2]).with_classes(2), 14);
        network.forward_pass(&[1.0, 1.0]).unwrap();
        let err = network.store_gradients(2.0).unwrap_err();
        assert!(matches!(err, NetworkError::ClassOutOfRange { class: 2, classes: 2 }));
    }

    #[test]
    fn classification_target_must_be_integer() {
        let mut network = build(&NetworkSpec::new(2, vec![2]).with_classes(2), 17);
        network.forward_pass(&[1.0, 1.0]).unwrap();
        for target in [1.5, f64::NAN, -1.0] {
            let err = network.store_gradients(target).unwrap_err();
            assert!(matches!(err, NetworkError::InvalidClassTarget { classes: 2, .. }));
        }
        assert!(network.edges().iter().flatten().flatten().all(|e| e.loss_gradients().is_empty()));
        network.store_gradients(1.0).unwrap();
    }

    #[test]
    fn weight_update_without_momentum() {
        let mut network = chain(1.0, 1.0);
        let id = EdgeId::new(1, 0, 0);
        network.learning_rate = 0.01;
        for g in [-0.1, 0.0, 0.1, 0.2, 0.3] {
            network.edge_mut(id).push_loss_gradient(g);
        }
        network.back_propagate_weight(id);
        assert_abs_diff_eq!(network.edge(id).weight(), 0.999, epsilon = 1e-12);
        assert!(network.edge(id).loss_gradients().is_empty());
    }

    #[test]
    fn weight_update_with_momentum() {
        let mut network = chain(1.0, 1.0);
        let id = EdgeId::new(1, 0, 0);
        network.learning_rate = 0.005;
        network.momentum = Some(0.8);
        network.edge_mut(id).set_velocity(-2.0);
        for g in [0.05, 0.15] {
            network.edge_mut(id).push_loss_gradient(g);
        }
        network.back_propagate_weight(id);
        assert_abs_diff_eq!(network.edge(id).velocity(), -1.5995, epsilon = 1e-12);
        assert_abs_diff_eq!(network.edge(id).weight(), 2.5995, epsilon = 1e-12);
        assert!(network.edge(id).loss_gradients().is_empty());
    }

    #[test]
    fn bias_update_averages_and_clears() {
        let mut network = chain(1.0, 1.0);
        let id = NeuronId::new(2, 0);
        network.learning_rate = 0.1;
        network.neuron_mut(id).set_bias(0.5);
        for g in [1.0, 2.0, 3.0] {
            network.neuron_mut(id).push_bias_gradient(g);
        }
        network.back_propagate_bias(id);
        assert_abs_diff_eq!(network.neuron(id).bias(), 0.3, epsilon = 1e-12);
        assert!(network.neuron(id).bias_gradients().is_empty());
    }

    #[test]
    fn bulk_updates_clear_every_gradient() {
        let mut network = build(&NetworkSpec::new(2, vec![3, 2]).with_classes(2), 15);
        for (x, y) in [([0.1, 0.9], 0.0), ([0.8, -0.3], 1.0)] {
            network.forward_pass(&x).unwrap();
            network.store_gradients(y).unwrap();
        }
        network.back_propagate_weights();
        network.back_propagate_biases();
        assert!(network.edges().iter().flatten().flatten().all(|e| e.loss_gradients().is_empty()));
        assert!(network.layers().iter().all(|l| l.neurons().iter().all(|n| n.bias_gradients().is_empty())));
    }

    #[test]
    fn training_step_reduces_loss() {
        let spec = NetworkSpec::new(2, vec![4]).with_classes(2).with_learning_rate(0.1);
        let mut network = build(&spec, 16);
        let x = [0.5, -0.5];
        let stage = network.output_stage();
        let before = stage.loss(&network.forward_pass(&x).unwrap(), 1.0).unwrap();
        for _ in 0..20 {
            network.forward_pass(&x).unwrap();
            network.store_gradients(1.0).unwrap();
            network.back_propagate_weights();
            network.back_propagate_biases();
        }
        let after = stage.loss(&network.forward_pass(&x).unwrap(), 1.0).unwrap();
        assert!(after < before);
    }
}
