/// Leaky rectified linear unit used by every hidden layer.
///
/// `f(x) = x` for `x >= 0`, otherwise `leak * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeakyRelu {
    pub leak: f64,
}

impl LeakyRelu {
    pub fn new(leak: f64) -> LeakyRelu {
        LeakyRelu { leak }
    }

    pub fn function(&self, x: f64) -> f64 {
        if x >= 0.0 { x } else { self.leak * x }
    }

    /// Derivative evaluated on the activated value. At `x == 0` this is `1`.
    pub fn derivative(&self, x: f64) -> f64 {
        if x >= 0.0 { 1.0 } else { self.leak }
    }
}

impl Default for LeakyRelu {
    fn default() -> Self {
        LeakyRelu { leak: 0.01 }
    }
}

/// Linear combination feeding a neuron: `sum(o_i * w_i) + bias`.
///
/// `values` and `weights` are zipped, so callers must pass equal lengths.
pub fn transfer(values: &[f64], weights: &[f64], bias: f64) -> f64 {
    debug_assert_eq!(values.len(), weights.len());
    values.iter().zip(weights.iter())
        .map(|(o, w)| o * w)
        .sum::<f64>() + bias
}

/// Softmax over one vector of logits.
///
/// `fit` computes the maximum logit and the normaliser
/// `sum(exp(z_i - max))` once; `probability` then maps a single logit.
/// The max is always subtracted before exponentiating so large logits
/// cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Softmax {
    max: f64,
    normaliser: f64,
}

impl Softmax {
    pub fn fit(logits: &[f64]) -> Softmax {
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let normaliser = logits.iter().map(|z| (z - max).exp()).sum();
        Softmax { max, normaliser }
    }

    pub fn probability(&self, z: f64) -> f64 {
        (z - self.max).exp() / self.normaliser
    }

    pub fn normaliser(&self) -> f64 {
        self.normaliser
    }

    /// Fits and applies softmax to the whole vector.
    pub fn activate(logits: &[f64]) -> Vec<f64> {
        let softmax = Softmax::fit(logits);
        logits.iter().map(|&z| softmax.probability(z)).collect()
    }
}
