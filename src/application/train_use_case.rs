// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Rasterize the alphabet     (Layer 4 - data)
//   Step 2: Build the autoencoder      (Layer 5 - ml)
//   Step 3: Fit, once per run          (Layer 5 - ml)
//   Step 4: Encode + plot              (Layer 5 - ml, Layer 6 - infra)
//   Step 5: Save versioned artifacts   (Layer 6 - infra)
//   Step 6: Convert the decoder        (Layer 6 - infra)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, ensure, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, Autodiff, NdArray, Wgpu},
    module::{AutodiffModule, Module},
    optim::AdamConfig,
    tensor::backend::{AutodiffBackend, Backend},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::data::{dataset::build_dataset, rasterizer::FontRasterizer};
use crate::domain::{glyph::ImageSize, history::TrainingHistory, latent::LatentSpaceData};
use crate::infra::{
    converter::{ConversionOutcome, WebConverter, DEFAULT_FLAGS, DEFAULT_PROGRAM},
    exporter::ArtifactStore,
    metrics::MetricsLogger,
    plots::Plotter,
};
use crate::ml::{
    inferencer::{encode_all, reconstruct},
    model::{GlyphAutoencoder, GlyphAutoencoderConfig, DOWNSAMPLE_FACTOR},
    trainer::{fit, FitOptions},
};

// ─── Compute Backend ─────────────────────────────────────────────────────────
/// Which Burn backend runs the numeric work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// CPU, always available
    #[default]
    NdArray,
    /// GPU through wgpu
    Wgpu,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ndarray" | "cpu" => Ok(Self::NdArray),
            "wgpu" | "gpu"    => Ok(Self::Wgpu),
            other => bail!("unknown backend '{other}' (expected 'ndarray' or 'wgpu')"),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NdArray => f.write_str("ndarray"),
            Self::Wgpu    => f.write_str("wgpu"),
        }
    }
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings for one training invocation.
// Saved next to the models so `generate` can rebuild the decoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub font_path:       String,
    pub output_dir:      String,
    pub image_size:      usize,
    pub font_size:       f32,
    pub latent_dims:     usize,
    pub characters:      String,
    pub epochs:          usize,
    pub runs:            usize,
    pub batch_size:      usize,
    pub lr:              f64,
    pub seed:            u64,
    pub backend:         BackendKind,
    pub reconstructions: usize,
    pub plots:           bool,
    pub converter:       String,
    pub converter_flags: Vec<String>,
    pub skip_convert:    bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            font_path:       "model_files/Roboto-Regular.ttf".to_string(),
            output_dir:      "model_files".to_string(),
            image_size:      64,
            font_size:       70.0,
            latent_dims:     2,
            characters:      "ABCDEFGHIJKLMNOPQRSTUVWXYZ".to_string(),
            epochs:          500,
            runs:            1,
            batch_size:      32,
            lr:              1e-3,
            seed:            42,
            backend:         BackendKind::NdArray,
            reconstructions: 10,
            plots:           true,
            converter:       DEFAULT_PROGRAM.to_string(),
            converter_flags: DEFAULT_FLAGS.iter().map(|s| s.to_string()).collect(),
            skip_convert:    false,
        }
    }
}

impl TrainConfig {
    /// Reject settings the pipeline cannot run with, before any work starts.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.image_size > 0, "image_size must be positive");
        ensure!(
            self.image_size % DOWNSAMPLE_FACTOR == 0,
            "image_size must be a multiple of {DOWNSAMPLE_FACTOR}, got {}",
            self.image_size
        );
        ensure!(self.font_size > 0.0, "font_size must be positive");
        ensure!(self.latent_dims > 0, "latent_dims must be at least 1");
        ensure!(!self.characters.is_empty(), "the character set is empty");
        ensure!(self.epochs > 0, "epochs must be at least 1");
        ensure!(self.runs > 0, "runs must be at least 1");
        ensure!(self.batch_size > 0, "batch_size must be at least 1");
        ensure!(self.lr > 0.0, "lr must be positive");
        Ok(())
    }

    pub fn image_dims(&self) -> ImageSize {
        ImageSize::square(self.image_size)
    }

    pub fn model_config(&self) -> GlyphAutoencoderConfig {
        GlyphAutoencoderConfig::new(self.image_size, self.image_size, self.latent_dims)
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            epochs:     self.epochs,
            batch_size: self.batch_size,
            lr:         self.lr,
            seed:       self.seed,
        }
    }
}

/// What one training invocation produced.
#[derive(Debug)]
pub struct TrainReport {
    pub version:    String,
    pub history:    TrainingHistory,
    /// None when conversion was skipped or its input could not be written
    pub conversion: Option<ConversionOutcome>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline on the configured backend
    pub fn execute(&self) -> Result<TrainReport> {
        self.config.validate()?;
        tracing::info!("Using the {} backend", self.config.backend);

        match self.config.backend {
            BackendKind::NdArray => self.run::<Autodiff<NdArray>>(&NdArrayDevice::Cpu),
            BackendKind::Wgpu    => self.run::<Autodiff<Wgpu>>(&WgpuDevice::default()),
        }
    }

    fn run<B: AutodiffBackend>(&self, device: &B::Device) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Rasterize one image per character ────────────────────────
        // A missing font stops the run here, before anything is written
        let rasterizer = FontRasterizer::from_file(&cfg.font_path, cfg.font_size)?;
        let dataset    = build_dataset(&rasterizer, &cfg.characters, cfg.image_dims())?;
        tracing::info!(
            "Built dataset: {} glyphs of {}x{}",
            dataset.samples().len(), cfg.image_size, cfg.image_size
        );

        // ── Step 2: Build the autoencoder and its optimiser ──────────────────
        B::seed(cfg.seed);
        let model_cfg = cfg.model_config();
        let mut model = model_cfg.init::<B>(device);
        tracing::info!("Built autoencoder with {} parameters\n{model}", model.num_params());
        let mut optim = AdamConfig::new().init::<B, GlyphAutoencoder<B>>();

        // The version is fixed up front so metrics rows and files agree
        let store   = ArtifactStore::new(&cfg.output_dir, ArtifactStore::timestamp_version())?;
        let metrics = MetricsLogger::new(store.dir(), store.version())?;

        // ── Step 3: Fit, accumulating history across runs ────────────────────
        let opts = cfg.fit_options();
        let mut history = TrainingHistory::new();
        for run in 1..=cfg.runs {
            tracing::info!("Run {}/{}: {} epochs", run, cfg.runs, opts.epochs);
            let (trained, run_history) = fit(
                model, &mut optim, dataset.clone(), &opts, Some(&metrics), history.epochs(),
            )?;
            model = trained;
            history.extend(run_history);
        }
        let model = model.valid();

        // ── Step 4: Latent coordinates and figures ───────────────────────────
        let coords = encode_all(&model.encoder, dataset.samples(), device)?;
        let latent = LatentSpaceData::new(coords, dataset.labels())?;

        if cfg.plots {
            let k = cfg.reconstructions.min(dataset.samples().len());
            let shown = &dataset.samples()[..k];
            let recon = if k > 0 { reconstruct(&model, shown, device)? } else { Vec::new() };
            let plotter = Plotter::new(Some(rasterizer.font()));

            warn_on_plot_error(
                "training curves",
                plotter.training_curves(&history, &store.versioned_file("training_curves", "png")),
            );
            if k > 0 {
                let originals: Vec<_> = shown.iter().map(|s| s.image.clone()).collect();
                warn_on_plot_error(
                    "reconstructions",
                    plotter.reconstructions(
                        &originals, &recon, &store.versioned_file("reconstructions", "png"),
                    ),
                );
            }
            if cfg.latent_dims == 2 {
                warn_on_plot_error(
                    "latent space",
                    plotter.latent_space(&latent, &store.versioned_file("latent_space", "png")),
                );
            }
        }

        // ── Step 5: Save history, models, config and latent data ─────────────
        store.save_history(&history)?;
        store.save_models(&model)?;
        store.save_config(cfg)?;
        store.save_latent(&latent)?;

        // ── Step 6: Hand the decoder to the web converter ────────────────────
        let conversion = if cfg.skip_convert {
            tracing::info!("Skipping web conversion");
            None
        } else {
            self.convert(&store, &model, &model_cfg)
        };

        Ok(TrainReport { version: store.version().to_string(), history, conversion })
    }

    /// Never fails the run: problems are logged and reported in the outcome.
    fn convert<B: Backend>(
        &self,
        store:     &ArtifactStore,
        model:     &GlyphAutoencoder<B>,
        model_cfg: &GlyphAutoencoderConfig,
    ) -> Option<ConversionOutcome> {
        let input = match store.save_web_decoder(&model.decoder, &model_cfg.decoder_topology()) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!("Cannot write the decoder for conversion: {e:#}");
                return None;
            }
        };

        let converter = WebConverter::new(&self.config.converter, self.config.converter_flags.clone());
        Some(converter.convert(&input, &store.web_model_dir()))
    }
}

fn warn_on_plot_error(what: &str, result: Result<()>) {
    if let Err(e) = result {
        tracing::warn!("Could not draw the {what} plot: {e:#}");
    }
}
