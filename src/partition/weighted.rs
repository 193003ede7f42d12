use std::collections::BTreeMap;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::PartitionError;
use crate::partition::partitioner::{check_sizes, slice_groups};
use crate::partition::Partition;

/// Default number of value bins for regression targets.
pub const DEFAULT_NUM_BINS: usize = 10;

/// Stratified batch sampler.
///
/// Datapoints are bucketed once, by class label for classification or by
/// equal-width value bin for regression. Each call draws `n` bucket ids
/// uniformly with replacement, then one datapoint uniformly with
/// replacement from each drawn bucket, and slices the `n` samples into
/// groups of `m` like [`Partitioner`](crate::partition::Partitioner).
/// Rare classes therefore show up about as often as common ones.
#[derive(Debug, Clone)]
pub struct WeightedPartitioner<R = StdRng> {
    n: usize,
    m: usize,
    /// Bucket ids (class labels, or dense bin ids) in ascending order.
    keys: Vec<usize>,
    /// Datapoint indices of each bucket, parallel to `keys`.
    pools: Vec<Vec<usize>>,
    rng: R,
}

impl WeightedPartitioner<StdRng> {
    pub fn new(
        n: usize,
        m: usize,
        targets: &[f64],
        regression: bool,
        num_bins: usize,
    ) -> Result<Self, PartitionError> {
        WeightedPartitioner::with_rng(n, m, targets, regression, num_bins, StdRng::from_entropy())
    }
}

impl<R: Rng> WeightedPartitioner<R> {
    /// `num_bins` is only read for regression.
    pub fn with_rng(
        n: usize,
        m: usize,
        targets: &[f64],
        regression: bool,
        num_bins: usize,
        rng: R,
    ) -> Result<Self, PartitionError> {
        check_sizes(n, m)?;
        if targets.len() != n {
            return Err(PartitionError::LabelCountMismatch { n, labels: targets.len() });
        }

        let buckets = if regression {
            bin_targets(targets, num_bins)?
        } else {
            group_classes(targets)?
        };
        let (keys, pools) = buckets.into_iter().unzip();
        Ok(WeightedPartitioner { n, m, keys, pools, rng })
    }

    /// Number of non-empty buckets.
    pub fn num_bins(&self) -> usize {
        self.pools.len()
    }

    /// Bucket id to datapoint indices.
    pub fn class_map(&self) -> BTreeMap<usize, Vec<usize>> {
        self.keys.iter().copied().zip(self.pools.iter().cloned()).collect()
    }
}

impl<R: Rng> Partition for WeightedPartitioner<R> {
    fn partition(&mut self) -> Vec<Vec<usize>> {
        let chosen: Vec<usize> = (0..self.n)
            .map(|_| self.rng.gen_range(0..self.pools.len()))
            .collect();
        let sampled: Vec<usize> = chosen.into_iter()
            .map(|bucket| {
                let pool = &self.pools[bucket];
                pool[self.rng.gen_range(0..pool.len())]
            })
            .collect();
        slice_groups(&sampled, self.m)
    }
}

fn group_classes(labels: &[f64]) -> Result<BTreeMap<usize, Vec<usize>>, PartitionError> {
    let mut classes: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, &label) in labels.iter().enumerate() {
        if !(label >= 0.0 && label.fract() == 0.0) {
            return Err(PartitionError::InvalidClassLabel { index, label });
        }
        classes.entry(label as usize).or_default().push(index);
    }
    Ok(classes)
}

/// Equal-width bins `[min + k w, min + (k + 1) w)` with the maximum clamped
/// into the last bin. Empty bins are dropped and the rest renumbered from 0.
fn bin_targets(targets: &[f64], num_bins: usize) -> Result<BTreeMap<usize, Vec<usize>>, PartitionError> {
    if num_bins == 0 {
        return Err(PartitionError::NoBins);
    }
    let min_y = targets.iter().copied().fold(f64::INFINITY, f64::min);
    let max_y = targets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max_y - min_y) / num_bins as f64;

    let mut bins = vec![Vec::new(); num_bins];
    for (index, &y) in targets.iter().enumerate() {
        // A zero width gives NaN here, which casts to bin 0.
        let bin = (((y - min_y) / width) as usize).min(num_bins - 1);
        bins[bin].push(index);
    }

    let filled: Vec<Vec<usize>> = bins.into_iter().filter(|b| !b.is_empty()).collect();
    if filled.len() < num_bins {
        debug!("dropped {} empty bins out of {}", num_bins - filled.len(), num_bins);
    }
    Ok(filled.into_iter().enumerate().collect())
}
