pub mod backward;
pub mod edge;
pub mod layer;
pub mod network;
pub mod neuron;
pub mod spec;

pub use backward::BackwardOrder;
pub use edge::{Edge, EdgeId};
pub use layer::Layer;
pub use network::Network;
pub use neuron::{Neuron, NeuronId};
pub use spec::NetworkSpec;
