use std::fmt;

/// Contingency table of target class (rows) against predicted class
/// (columns).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(classes: usize) -> ConfusionMatrix {
        ConfusionMatrix { counts: vec![vec![0; classes]; classes] }
    }

    /// Builds the table from parallel target and predicted class ids.
    pub fn from_predictions(targets: &[f64], predictions: &[f64], classes: usize) -> ConfusionMatrix {
        let mut matrix = ConfusionMatrix::new(classes);
        for (&target, &predicted) in targets.iter().zip(predictions) {
            matrix.record(target as usize, predicted as usize);
        }
        matrix
    }

    /// # Panics
    /// Panics if either class is not below `classes`.
    pub fn record(&mut self, target: usize, predicted: usize) {
        self.counts[target][predicted] += 1;
    }

    pub fn classes(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, target: usize, predicted: usize) -> usize {
        self.counts[target][predicted]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.classes()).map(|i| self.counts[i][i]).sum();
        correct as f64 / total as f64
    }

    /// Per-class dice score `2 TP / (row total + column total)`; a class
    /// that never occurs and is never predicted scores 0.
    pub fn dice_scores(&self) -> Vec<f64> {
        (0..self.classes())
            .map(|i| {
                let true_positive = self.counts[i][i];
                let row: usize = self.counts[i].iter().sum();
                let column: usize = self.counts.iter().map(|r| r[i]).sum();
                if row + column == 0 {
                    0.0
                } else {
                    2.0 * true_positive as f64 / (row + column) as f64
                }
            })
            .collect()
    }

    pub fn mean_dice(&self) -> f64 {
        let scores = self.dice_scores();
        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.counts.iter().flatten().max().copied().unwrap_or(0).to_string().len().max(2);
        write!(f, "{:>6}", "y\\y_hat")?;
        for j in 0..self.classes() {
            write!(f, " {:>width$}", j)?;
        }
        for (i, row) in self.counts.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{:>7}", i)?;
            for count in row {
                write!(f, " {:>width$}", count)?;
            }
        }
        Ok(())
    }
}
