pub mod partitioner;
pub mod weighted;

pub use partitioner::Partitioner;
pub use weighted::WeightedPartitioner;

/// Produces the batches of datapoint indices for one epoch.
///
/// Each call is independent: a fresh shuffle or fresh draw every time.
pub trait Partition {
    fn partition(&mut self) -> Vec<Vec<usize>>;
}
