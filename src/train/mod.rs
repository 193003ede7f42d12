pub mod confusion;
pub mod dataset;
pub mod epoch_stats;
pub mod loop_fn;
pub mod tester;
pub mod train_config;

pub use confusion::ConfusionMatrix;
pub use dataset::Dataset;
pub use epoch_stats::EpochStats;
pub use loop_fn::train_loop;
pub use tester::{evaluate, test_network, validation_loss, Evaluation};
pub use train_config::TrainConfig;
