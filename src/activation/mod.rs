pub mod activation;

pub use activation::{transfer, LeakyRelu, Softmax};
