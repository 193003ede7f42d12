pub mod activation;
pub mod error;
pub mod loss;
pub mod network;
pub mod partition;
pub mod train;

// Convenience re-exports
pub use activation::activation::{LeakyRelu, Softmax};
pub use error::{NetworkError, PartitionError, TrainError};
pub use loss::output_stage::OutputStage;
pub use network::edge::{Edge, EdgeId};
pub use network::network::Network;
pub use network::neuron::{Neuron, NeuronId};
pub use network::spec::NetworkSpec;
pub use partition::{Partition, Partitioner, WeightedPartitioner};
pub use train::dataset::Dataset;
pub use train::loop_fn::train_loop;
pub use train::tester::{test_network, Evaluation};
pub use train::train_config::TrainConfig;
