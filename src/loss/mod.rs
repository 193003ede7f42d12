pub mod mse;
pub mod cross_entropy;
pub mod output_stage;

pub use mse::MseLoss;
pub use cross_entropy::CrossEntropyLoss;
pub use output_stage::{argmax, class_of, OutputStage};
