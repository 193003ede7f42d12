use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use neurograph::{test_network, train_loop, Dataset, Network, NetworkSpec, TrainConfig};

fn sine_points(rng: &mut StdRng, count: usize) -> Dataset {
    let features: Vec<Vec<f64>> = (0..count).map(|_| vec![rng.gen_range(-PI..PI)]).collect();
    let targets = features.iter().map(|x| x[0].sin()).collect();
    Dataset::new(features, targets).expect("generated rows share one width")
}

fn main() {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(99);
    let spec = NetworkSpec::new(1, vec![24, 24])
        .as_regression()
        .with_learning_rate(0.005)
        .with_momentum(0.9)
        .with_he_init();
    let mut network = Network::new(&spec, &mut rng).expect("valid architecture");

    let train = sine_points(&mut rng, 500);
    let validation = sine_points(&mut rng, 100);

    let config = TrainConfig::new(500, 25).seeded(3);
    let history = train_loop(&mut network, &train, Some(&validation), &config).expect("training failed");
    for stats in history.iter().step_by(100) {
        println!(
            "Epoch {}: loss = {:.6}, validation = {:.6}",
            stats.epoch,
            stats.train_loss,
            stats.val_loss.unwrap_or(f64::NAN)
        );
    }

    let evaluation = test_network(&mut network, &validation).expect("testing failed");
    for x in [-PI / 2.0, 0.0, PI / 4.0, PI / 2.0] {
        let y_hat = network.forward_pass(&[x]).expect("one feature")[0];
        println!("sin({x:.3}) = {:.4}, predicted {y_hat:.4}", x.sin());
    }
    println!("Validation MSE = {:.6}", evaluation.loss);
}
