// Trains a small classifier on points inside/outside the unit circle.
//
//   cargo run                       default architecture
//   cargo run -- network.json       architecture from a saved NetworkSpec
//
// Set RUST_LOG=info to see per-epoch losses and the test confusion matrix.
use std::error::Error;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use neurograph::{test_network, train_loop, Dataset, Network, NetworkSpec, TrainConfig};

fn circle_points(rng: &mut StdRng, count: usize) -> Result<Dataset, Box<dyn Error>> {
    let mut features = Vec::with_capacity(count);
    let mut targets = Vec::with_capacity(count);
    for _ in 0..count {
        let x: f64 = rng.gen_range(-1.5..1.5);
        let y: f64 = rng.gen_range(-1.5..1.5);
        features.push(vec![x, y]);
        targets.push(if x * x + y * y < 1.0 { 1.0 } else { 0.0 });
    }
    Ok(Dataset::new(features, targets)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let spec = match std::env::args().nth(1) {
        Some(path) => {
            info!("loading network spec from {}", path);
            NetworkSpec::load_json(&path)?
        }
        None => NetworkSpec::new(2, vec![8, 8]).with_learning_rate(0.05).with_adaptive(),
    };

    let mut rng = StdRng::seed_from_u64(7);
    let mut network = Network::new(&spec, &mut rng)?;
    let train = circle_points(&mut rng, 400)?;
    let validation = circle_points(&mut rng, 100)?;
    let test = circle_points(&mut rng, 200)?;

    let config = TrainConfig::new(200, 16).seeded(11);
    let history = train_loop(&mut network, &train, Some(&validation), &config)?;
    if let Some(last) = history.last() {
        println!("final training loss: {:.6}", last.train_loss);
    }

    let evaluation = test_network(&mut network, &test)?;
    println!("testing loss: {:.6}", evaluation.loss);
    if let Some(confusion) = &evaluation.confusion {
        println!("{}", confusion);
        println!("accuracy: {:.4}  mean dice: {:.4}", confusion.accuracy(), confusion.mean_dice());
    }
    Ok(())
}
