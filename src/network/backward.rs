use crate::network::edge::EdgeId;

/// Iterator over every edge in the order gradients must be stored for one
/// datapoint: the output boundary first, back towards the input.
///
/// Within an edge layer edges are grouped by right neuron, and the flag is
/// `true` for the first edge of each right neuron (the one that also records
/// that neuron's bias gradient).
///
/// The iterator owns a copy of the layer widths, so the network can be
/// borrowed mutably while it is consumed.
#[derive(Debug, Clone)]
pub struct BackwardOrder {
    widths: Vec<usize>,
    /// Edge layer still to be visited, counted from one (`0` means done).
    remaining_layers: usize,
    right_row: usize,
    left_row: usize,
}

impl BackwardOrder {
    pub(crate) fn new(widths: Vec<usize>) -> BackwardOrder {
        let remaining_layers = widths.len().saturating_sub(1);
        BackwardOrder { widths, remaining_layers, right_row: 0, left_row: 0 }
    }
}

impl Iterator for BackwardOrder {
    type Item = (EdgeId, bool);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining_layers == 0 {
            return None;
        }
        let left_layer = self.remaining_layers - 1;
        let item = (
            EdgeId::new(left_layer, self.left_row, self.right_row),
            self.left_row == 0,
        );

        self.left_row += 1;
        if self.left_row == self.widths[left_layer] {
            self.left_row = 0;
            self.right_row += 1;
            if self.right_row == self.widths[left_layer + 1] {
                self.right_row = 0;
                self.remaining_layers -= 1;
            }
        }
        Some(item)
    }
}
