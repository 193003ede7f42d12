/// Squared-error loss for the single linear output of a regression network.
pub struct MseLoss;

impl MseLoss {
    /// `(y_hat - y)²`
    pub fn loss(predicted: f64, expected: f64) -> f64 {
        (predicted - expected).powi(2)
    }

    /// `2 (y_hat - y)`
    pub fn gradient(predicted: f64, expected: f64) -> f64 {
        2.0 * (predicted - expected)
    }
}
