// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Mini-batch training of the autoencoder over the full glyph
// dataset using Burn's DataLoader and an optimiser owned by the
// caller.
//
// The optimiser is passed in by mutable reference so its state
// (Adam moments) survives between runs: calling `fit` twice is
// the same as training once for twice as many epochs.
//
// Each epoch reports:
//   - loss:            mean binary cross-entropy
//   - binary_accuracy: fraction of pixels on the right side of 0.5
// both weighted by batch size, so a short last batch counts less.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{batcher::GlyphBatcher, dataset::GlyphDataset};
use crate::domain::history::TrainingHistory;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{binary_accuracy, GlyphAutoencoder};

/// Per-run training options
#[derive(Debug, Clone)]
pub struct FitOptions {
    pub epochs:     usize,
    pub batch_size: usize,
    pub lr:         f64,
    pub seed:       u64,
}

/// Train `model` for `opts.epochs` epochs and return it with this
/// run's history. `epoch_offset` is the number of epochs already
/// trained in earlier runs, used only for logging.
pub fn fit<B, O>(
    mut model:    GlyphAutoencoder<B>,
    optim:        &mut O,
    dataset:      GlyphDataset,
    opts:         &FitOptions,
    metrics:      Option<&MetricsLogger>,
    epoch_offset: usize,
) -> Result<(GlyphAutoencoder<B>, TrainingHistory)>
where
    B: AutodiffBackend,
    O: Optimizer<GlyphAutoencoder<B>, B>,
{
    ensure!(opts.epochs > 0, "epochs must be at least 1");
    ensure!(opts.batch_size > 0, "batch_size must be at least 1");

    let total_samples = dataset.samples().len();
    ensure!(total_samples > 0, "cannot train on an empty dataset");

    let loader = DataLoaderBuilder::new(GlyphBatcher::<B>::new())
        .batch_size(opts.batch_size)
        .shuffle(opts.seed)
        .num_workers(1)
        .build(dataset);

    let mut history  = TrainingHistory::new();
    let total_epochs = epoch_offset + opts.epochs;

    for epoch in 1..=opts.epochs {
        let mut loss_sum = 0.0f64;
        let mut acc_sum  = 0.0f64;
        let mut seen     = 0usize;

        for batch in loader.iter() {
            let n      = batch.images.dims()[0];
            let output = model.forward_loss(batch.images.clone());

            let loss_val: f64 = output.loss.clone().into_scalar().elem::<f64>();
            let acc_val:  f64 = binary_accuracy(
                output.reconstructions.inner(),
                batch.images.inner(),
            )
            .into_scalar()
            .elem::<f64>();

            loss_sum += loss_val * n as f64;
            acc_sum  += acc_val  * n as f64;
            seen     += n;

            // Backward pass + optimiser update
            let grads = output.loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(opts.lr, model, grads);
        }

        let epoch_loss = loss_sum / seen.max(1) as f64;
        let epoch_acc  = acc_sum  / seen.max(1) as f64;
        history.push(epoch_loss, epoch_acc);

        let global_epoch = epoch_offset + epoch;
        println!(
            "Epoch {:>4}/{} | loss={:.4} | binary_accuracy={:.4}",
            global_epoch, total_epochs, epoch_loss, epoch_acc,
        );

        if let Some(logger) = metrics {
            logger.log(&EpochMetrics::new(global_epoch, epoch_loss, epoch_acc))?;
        }
    }

    tracing::info!(
        "Finished {} epochs (loss={:.4}, binary_accuracy={:.4})",
        opts.epochs,
        history.last_loss().unwrap_or(f64::NAN),
        history.last_accuracy().unwrap_or(f64::NAN),
    );
    Ok((model, history))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::AdamConfig;

    use crate::data::dataset::build_dataset;
    use crate::data::testing::BlockGlyphs;
    use crate::domain::glyph::ImageSize;
    use crate::ml::model::GlyphAutoencoderConfig;

    type TestBackend = Autodiff<NdArray>;

    fn opts(epochs: usize) -> FitOptions {
        FitOptions { epochs, batch_size: 2, lr: 1e-3, seed: 7 }
    }

    #[test]
    fn test_repeated_runs_accumulate_history() {
        let device  = Default::default();
        let dataset = build_dataset(&BlockGlyphs, "ABC", ImageSize::square(16)).unwrap();
        let mut model = GlyphAutoencoderConfig::new(16, 16, 2).init::<TestBackend>(&device);
        let mut optim = AdamConfig::new().init::<TestBackend, GlyphAutoencoder<TestBackend>>();

        let runs   = 2;
        let epochs = 2;
        let mut history = TrainingHistory::new();
        for _ in 0..runs {
            let (m, run_history) = fit(
                model, &mut optim, dataset.clone(), &opts(epochs), None, history.epochs(),
            )
            .unwrap();
            assert_eq!(run_history.epochs(), epochs);
            model = m;
            history.extend(run_history);
        }

        assert_eq!(history.loss.len(), runs * epochs);
        assert_eq!(history.binary_accuracy.len(), runs * epochs);
        assert!(history.loss.iter().all(|l| l.is_finite() && *l > 0.0));
        assert!(history.binary_accuracy.iter().all(|a| (0.0..=1.0).contains(a)));
    }

    #[test]
    fn test_zero_epochs_rejected() {
        let device  = Default::default();
        let dataset = build_dataset(&BlockGlyphs, "A", ImageSize::square(16)).unwrap();
        let model   = GlyphAutoencoderConfig::new(16, 16, 2).init::<TestBackend>(&device);
        let mut optim = AdamConfig::new().init::<TestBackend, GlyphAutoencoder<TestBackend>>();
        assert!(fit(model, &mut optim, dataset, &opts(0), None, 0).is_err());
    }
}
