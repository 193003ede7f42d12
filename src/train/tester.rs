use log::info;

use crate::error::TrainError;
use crate::network::network::Network;
use crate::train::confusion::ConfusionMatrix;
use crate::train::dataset::Dataset;

/// Result of a forward-only pass over a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Summed loss divided by the number of datapoints.
    pub loss: f64,
    /// Argmax class per datapoint for classification, output value for
    /// regression.
    pub predictions: Vec<f64>,
    /// Only for classification networks.
    pub confusion: Option<ConfusionMatrix>,
}

/// Runs every datapoint through `network` once without touching any
/// gradient, scoring it with the network's own loss.
pub fn evaluate(network: &mut Network, data: &Dataset) -> Result<Evaluation, TrainError> {
    data.check_compatible(network)?;
    let stage = network.output_stage();

    let mut total_loss = 0.0;
    let mut predictions = Vec::with_capacity(data.len());
    for (x, &y) in data.features().iter().zip(data.targets()) {
        let output = network.forward_pass(x)?;
        total_loss += stage.loss(&output, y)?;
        predictions.push(stage.predict(&output));
    }

    let confusion = if network.is_regressor() {
        None
    } else {
        Some(ConfusionMatrix::from_predictions(data.targets(), &predictions, stage.width()))
    };
    Ok(Evaluation {
        loss: total_loss / data.len() as f64,
        predictions,
        confusion,
    })
}

/// Mean loss of `network` over `data`; used once per epoch for validation.
pub fn validation_loss(network: &mut Network, data: &Dataset) -> Result<f64, TrainError> {
    Ok(evaluate(network, data)?.loss)
}

/// Evaluates `network` on held-out data and logs the testing loss, plus
/// the confusion matrix and dice scores for classification.
pub fn test_network(network: &mut Network, data: &Dataset) -> Result<Evaluation, TrainError> {
    let evaluation = evaluate(network, data)?;
    info!("testing loss: {:.4}", evaluation.loss);
    if let Some(confusion) = &evaluation.confusion {
        info!("confusion matrix:\n{}", confusion);
        let scores: Vec<String> = confusion.dice_scores().iter().map(|s| format!("{:.4}", s)).collect();
        info!("dice scores: [{}]", scores.join(", "));
        info!("mean dice score: {:.4}", confusion.mean_dice());
    }
    Ok(evaluation)
}
