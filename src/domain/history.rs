// ============================================================
// Layer 3 — Training History
// ============================================================
// Accumulates per-epoch metrics across training runs.
//
// The training loop may be invoked several times in one process
// (see `--runs`). Every invocation returns the history of its own
// epochs, which is appended here, so the series only ever grow:
//
//   run 1 (3 epochs):  loss = [a, b, c]
//   run 2 (3 epochs):  loss = [a, b, c, d, e, f]
//
// Serialised as {"loss": [...], "binary_accuracy": [...]}.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    /// Mean binary cross-entropy per epoch
    pub loss: Vec<f64>,

    /// Fraction of correctly thresholded pixels per epoch
    pub binary_accuracy: Vec<f64>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one epoch's metrics.
    pub fn push(&mut self, loss: f64, binary_accuracy: f64) {
        self.loss.push(loss);
        self.binary_accuracy.push(binary_accuracy);
    }

    /// Append another run's history after the epochs already recorded.
    pub fn extend(&mut self, other: TrainingHistory) {
        self.loss.extend(other.loss);
        self.binary_accuracy.extend(other.binary_accuracy);
    }

    /// Number of epochs recorded so far
    pub fn epochs(&self) -> usize {
        self.loss.len()
    }

    pub fn last_loss(&self) -> Option<f64> {
        self.loss.last().copied()
    }

    pub fn last_accuracy(&self) -> Option<f64> {
        self.binary_accuracy.last().copied()
    }
}
