use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use neurograph::{test_network, train_loop, Dataset, Network, NetworkSpec, TrainConfig};

// Three rings around the origin; the outer ring is much rarer, so batches
// are drawn with the weighted partitioner.
fn ring_points(rng: &mut StdRng, count: usize) -> Dataset {
    let mut features = Vec::with_capacity(count);
    let mut targets = Vec::with_capacity(count);
    while features.len() < count {
        let x: f64 = rng.gen_range(-2.0..2.0);
        let y: f64 = rng.gen_range(-2.0..2.0);
        let r = (x * x + y * y).sqrt();
        let class = if r < 0.8 {
            0.0
        } else if r < 1.6 {
            1.0
        } else if r < 2.0 {
            2.0
        } else {
            continue;
        };
        features.push(vec![x, y]);
        targets.push(class);
    }
    Dataset::new(features, targets).expect("generated rows share one width")
}

fn main() {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(2024);
    let spec = NetworkSpec::new(2, vec![16, 16])
        .with_classes(3)
        .with_learning_rate(0.02)
        .with_adaptive()
        .with_he_init();
    let mut network = Network::new(&spec, &mut rng).expect("valid architecture");

    let train = ring_points(&mut rng, 600);
    let test = ring_points(&mut rng, 300);

    let config = TrainConfig::new(300, 20).weighted(10).seeded(1);
    let history = train_loop(&mut network, &train, None, &config).expect("training failed");
    for stats in history.iter().step_by(50) {
        println!("Epoch {}: loss = {:.6}", stats.epoch, stats.train_loss);
    }

    let evaluation = test_network(&mut network, &test).expect("testing failed");
    println!("Testing loss = {:.6}", evaluation.loss);
    if let Some(confusion) = evaluation.confusion {
        println!("{confusion}");
        println!("Dice scores: {:?}", confusion.dice_scores());
    }
}
