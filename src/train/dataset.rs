use std::collections::BTreeSet;

use crate::error::TrainError;
use crate::network::network::Network;

/// Feature rows paired with their targets: a class id for classification,
/// a value for regression.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl Dataset {
    /// Fails on an empty set, unequal lengths, or rows of differing width.
    pub fn new(features: Vec<Vec<f64>>, targets: Vec<f64>) -> Result<Dataset, TrainError> {
        if features.len() != targets.len() {
            return Err(TrainError::LengthMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }
        let width = features.first().ok_or(TrainError::EmptyDataset)?.len();
        if let Some((row, bad)) = features.iter().enumerate().find(|(_, f)| f.len() != width) {
            return Err(TrainError::RaggedFeatures { row, expected: width, got: bad.len() });
        }
        Ok(Dataset { features, targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn num_features(&self) -> usize {
        self.features[0].len()
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// # Panics
    /// Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> (&[f64], f64) {
        (&self.features[index], self.targets[index])
    }

    /// Number of distinct target values.
    pub fn num_classes(&self) -> usize {
        self.targets.iter().map(|t| t.to_bits()).collect::<BTreeSet<u64>>().len()
    }

    /// Checks that `network` can consume this data: matching input width,
    /// and for classification enough output neurons and integer class ids
    /// in `[0, outputs)`.
    pub fn check_compatible(&self, network: &Network) -> Result<(), TrainError> {
        let inputs = network.neuron_counts()[0];
        if self.num_features() != inputs {
            return Err(TrainError::FeatureCountMismatch { features: self.num_features(), inputs });
        }
        if network.is_regressor() {
            return Ok(());
        }

        let outputs = *network.neuron_counts().last().unwrap_or(&0);
        let classes = self.num_classes();
        if outputs < classes {
            return Err(TrainError::TooFewOutputs { outputs, classes });
        }
        for (index, &target) in self.targets.iter().enumerate() {
            if !(target >= 0.0 && target.fract() == 0.0 && (target as usize) < outputs) {
                return Err(TrainError::InvalidTarget { index, target, outputs });
            }
        }
        Ok(())
    }
}
