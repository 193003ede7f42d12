use crate::error::NetworkError;

/// Categorical cross-entropy over a softmax output.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// `-ln(y_hat[class])`
    ///
    /// Fails if `class` is not a row of `predicted` or if the selected value
    /// is not a probability.
    pub fn loss(predicted: &[f64], class: usize) -> Result<f64, NetworkError> {
        let value = *predicted.get(class).ok_or(NetworkError::ClassOutOfRange {
            class,
            classes: predicted.len(),
        })?;
        if !(0.0..=1.0).contains(&value) {
            return Err(NetworkError::InvalidProbability { class, value });
        }
        Ok(-value.ln())
    }

    /// Gradient of softmax followed by cross-entropy with respect to the
    /// logit of `row`: `y_hat[row] - [row == class]`.
    pub fn gradient(predicted: f64, row: usize, class: usize) -> f64 {
        predicted - if row == class { 1.0 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn loss_is_negative_log_of_target_probability() {
        let y_hat = [0.1, 0.7, 0.2];
        let loss = CrossEntropyLoss::loss(&y_hat, 1).unwrap();
        assert_abs_diff_eq!(loss, -(0.7f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn loss_rejects_values_outside_unit_interval() {
        let err = CrossEntropyLoss::loss(&[1.5, -0.5], 0).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidProbability { class: 0, .. }));
    }

    #[test]
    fn loss_rejects_unknown_class() {
        let err = CrossEntropyLoss::loss(&[0.5, 0.5], 2).unwrap_err();
        assert!(matches!(err, NetworkError::ClassOutOfRange { class: 2, classes: 2 }));
    }

    #[test]
    fn gradient_subtracts_indicator() {
        assert_abs_diff_eq!(CrossEntropyLoss::gradient(0.3, 1, 1), -0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(CrossEntropyLoss::gradient(0.3, 0, 1), 0.3, epsilon = 1e-12);
    }
}
