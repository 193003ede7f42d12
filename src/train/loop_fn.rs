use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::TrainError;
use crate::network::network::Network;
use crate::partition::{Partition, Partitioner, WeightedPartitioner};
use crate::train::dataset::Dataset;
use crate::train::epoch_stats::EpochStats;
use crate::train::tester::validation_loss;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs of mini-batch gradient
/// descent and returns the statistics of every epoch.
///
/// Each epoch asks the partitioner for a fresh set of batches. Every
/// datapoint of a batch is forwarded and its gradients stored; the weights
/// and biases are then updated once from the averaged gradients.
///
/// # Arguments
/// - `network`: modified in place
/// - `train`: training data
/// - `validation`: optional held-out data, scored once per epoch with
///                  forward passes only
/// - `config`: epochs, batch size and batch sampling
///
/// # Errors
/// Fails before any update if either dataset does not fit the network or
/// the batch size is out of range for the training data.
pub fn train_loop(
    network: &mut Network,
    train: &Dataset,
    validation: Option<&Dataset>,
    config: &TrainConfig,
) -> Result<Vec<EpochStats>, TrainError> {
    train.check_compatible(network)?;
    if let Some(validation) = validation {
        validation.check_compatible(network)?;
    }
    let mut partitioner = build_partitioner(network, train, config)?;

    let report_every = config.epochs.div_ceil(100).max(1);
    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 0..config.epochs {
        let t_start = Instant::now();

        // ── One partition of the training data ─────────────────────────────
        let train_loss = run_one_epoch(network, train, partitioner.as_mut())?;

        // ── Validation ────────────────────────────────────────────────────
        let val_loss = match validation {
            Some(data) => Some(validation_loss(network, data)?),
            None => None,
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            val_loss,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        if epoch % report_every == 0 || epoch + 1 == config.epochs {
            match stats.val_loss {
                Some(val) => info!(
                    "epoch {}/{}: training loss {:.6}, validation loss {:.6}",
                    epoch + 1, config.epochs, stats.train_loss, val
                ),
                None => info!(
                    "epoch {}/{}: training loss {:.6}",
                    epoch + 1, config.epochs, stats.train_loss
                ),
            }
        }
        history.push(stats);
    }

    Ok(history)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn build_partitioner(
    network: &Network,
    train: &Dataset,
    config: &TrainConfig,
) -> Result<Box<dyn Partition>, TrainError> {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let n = train.len();
    let partitioner: Box<dyn Partition> = if config.weighted {
        debug!("weighted batches over {} datapoints, batch size {}", n, config.batch_size);
        Box::new(WeightedPartitioner::with_rng(
            n,
            config.batch_size,
            train.targets(),
            network.is_regressor(),
            config.num_bins,
            rng,
        )?)
    } else {
        debug!("shuffled batches over {} datapoints, batch size {}", n, config.batch_size);
        Box::new(Partitioner::with_rng(n, config.batch_size, rng)?)
    };
    Ok(partitioner)
}

/// Trains on every batch of one partition. Returns the summed loss of all
/// datapoints seen divided by the dataset size.
fn run_one_epoch(
    network: &mut Network,
    train: &Dataset,
    partitioner: &mut dyn Partition,
) -> Result<f64, TrainError> {
    let stage = network.output_stage();
    let mut total_loss = 0.0;

    for batch in partitioner.partition() {
        for index in batch {
            let (x, y) = train.get(index);
            let output = network.forward_pass(x)?;
            total_loss += stage.loss(&output, y)?;
            network.store_gradients(y)?;
        }
        network.back_propagate_weights();
        network.back_propagate_biases();
    }

    Ok(total_loss / train.len() as f64)
}
