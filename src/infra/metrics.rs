// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// The same file is shared by every training invocation, so each
// row carries the artifact version it belongs to. Epoch numbers
// keep counting across runs of one invocation.
//
// Metrics recorded per epoch:
//   - version:         the artifact version of the invocation
//   - epoch:           the epoch number (1, 2, 3, ...)
//   - loss:            mean binary cross-entropy
//   - binary_accuracy: fraction of pixels thresholded correctly
//
// Output file: <output_dir>/metrics.csv
//
// Example CSV output:
//   version,epoch,loss,binary_accuracy
//   20261016_101500,1,0.693100,0.512000
//   20261016_101500,2,0.541200,0.804000
//   ...
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number, counted across runs (starts at 1)
    pub epoch: usize,

    /// Mean binary cross-entropy over all samples
    pub loss: f64,

    /// Fraction of pixels whose prediction lands on the right
    /// side of 0.5. Range: [0.0, 1.0]
    pub binary_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, loss: f64, binary_accuracy: f64) -> Self {
        Self { epoch, loss, binary_accuracy }
    }
}

/// Appends epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
    version:  String,
}

impl MetricsLogger {
    /// Create a new MetricsLogger for one artifact version.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>, version: impl Into<String>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "version,epoch,loss,binary_accuracy")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path, version: version.into() })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{},{:.6},{:.6}",
            self.version, m.epoch, m.loss, m.binary_accuracy,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: loss={:.4}, binary_accuracy={:.4}",
            m.epoch,
            m.loss,
            m.binary_accuracy,
        );
        Ok(())
    }
}
