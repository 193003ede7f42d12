use serde::{Serialize, Deserialize};

use crate::partition::weighted::DEFAULT_NUM_BINS;

fn default_num_bins() -> usize { DEFAULT_NUM_BINS }

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`: total number of partitions drawn and trained on
/// - `batch_size`: datapoints per batch; must not exceed the dataset size
/// - `weighted`: use the stratified `WeightedPartitioner` instead of a
///                  plain shuffle
/// - `num_bins`: value bins for weighted regression batches
/// - `seed`: fixes the batch sampler's generator when set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    #[serde(default)]
    pub weighted: bool,
    #[serde(default = "default_num_bins")]
    pub num_bins: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig`: unweighted batches, unseeded.
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            weighted: false,
            num_bins: DEFAULT_NUM_BINS,
            seed: None,
        }
    }

    pub fn weighted(mut self, num_bins: usize) -> Self {
        self.weighted = true;
        self.num_bins = num_bins;
        self
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
