use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::PartitionError;
use crate::partition::Partition;

/// Shuffles `0..n` and slices it into consecutive groups of `m`, the last
/// group holding the remainder.
#[derive(Debug, Clone)]
pub struct Partitioner<R = StdRng> {
    n: usize,
    m: usize,
    rng: R,
}

impl Partitioner<StdRng> {
    pub fn new(n: usize, m: usize) -> Result<Self, PartitionError> {
        Partitioner::with_rng(n, m, StdRng::from_entropy())
    }
}

impl<R: Rng> Partitioner<R> {
    /// Fails if `n` or `m` is zero, or if `m > n`.
    pub fn with_rng(n: usize, m: usize, rng: R) -> Result<Self, PartitionError> {
        check_sizes(n, m)?;
        Ok(Partitioner { n, m, rng })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn m(&self) -> usize {
        self.m
    }

    /// `ceil(n / m)`
    pub fn num_groups(&self) -> usize {
        (self.n + self.m - 1) / self.m
    }
}

impl<R: Rng> Partition for Partitioner<R> {
    fn partition(&mut self) -> Vec<Vec<usize>> {
        let mut ints: Vec<usize> = (0..self.n).collect();
        ints.shuffle(&mut self.rng);
        slice_groups(&ints, self.m)
    }
}

pub(crate) fn check_sizes(n: usize, m: usize) -> Result<(), PartitionError> {
    if n == 0 || m == 0 {
        return Err(PartitionError::NonPositive { n, m });
    }
    if m > n {
        return Err(PartitionError::BatchTooLarge { m, n });
    }
    Ok(())
}

/// Consecutive groups of `m`; the final group takes whatever is left.
pub(crate) fn slice_groups(items: &[usize], m: usize) -> Vec<Vec<usize>> {
    items.chunks(m).map(|group| group.to_vec()).collect()
}
