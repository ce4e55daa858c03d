// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `generate`
// and all their configurable flags.
//
// Every `train` default matches TrainConfig::default(), so a bare
// `glyph-cae train` reproduces the fixed 26-letter, 64x64, 2-D run.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::{BackendKind, TrainConfig};
use crate::infra::converter::DEFAULT_PROGRAM;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the autoencoder on rendered glyphs and export everything
    Train(TrainArgs),

    /// Decode one latent point of a trained version into a PNG
    Generate(GenerateArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// TrueType/OpenType font used to render the glyphs
    #[arg(long, default_value = "model_files/Roboto-Regular.ttf")]
    pub font: String,

    /// Directory that receives every exported artifact
    #[arg(long, default_value = "model_files")]
    pub output_dir: String,

    /// Side of the square glyph images, a multiple of 8
    #[arg(long, default_value_t = 64)]
    pub image_size: usize,

    /// Font size in pixels used when rendering
    #[arg(long, default_value_t = 70.0)]
    pub font_size: f32,

    /// Dimensionality of the latent space
    #[arg(long, default_value_t = 2)]
    pub latent_dims: usize,

    /// Characters to render, one sample each
    #[arg(long, default_value = "ABCDEFGHIJKLMNOPQRSTUVWXYZ")]
    pub characters: String,

    /// Epochs per run
    #[arg(long, default_value_t = 500)]
    pub epochs: usize,

    /// Number of consecutive runs; history and optimiser state carry over
    #[arg(long, default_value_t = 1)]
    pub runs: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Seed for weight initialisation and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Compute backend: ndarray (CPU) or wgpu (GPU)
    #[arg(long, default_value_t = BackendKind::NdArray)]
    pub backend: BackendKind,

    /// How many originals/reconstructions to show in the grid
    #[arg(long, default_value_t = 10)]
    pub reconstructions: usize,

    /// Do not render PNG plots
    #[arg(long)]
    pub no_plots: bool,

    /// Program that converts the decoder for the web runtime
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    pub converter: String,

    /// Skip the web conversion step
    #[arg(long)]
    pub skip_convert: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            font_path:       a.font,
            output_dir:      a.output_dir,
            image_size:      a.image_size,
            font_size:       a.font_size,
            latent_dims:     a.latent_dims,
            characters:      a.characters,
            epochs:          a.epochs,
            runs:            a.runs,
            batch_size:      a.batch_size,
            lr:              a.lr,
            seed:            a.seed,
            backend:         a.backend,
            reconstructions: a.reconstructions,
            plots:           !a.no_plots,
            converter:       a.converter,
            skip_convert:    a.skip_convert,
            ..TrainConfig::default()
        }
    }
}

/// All arguments for the `generate` command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Artifact version printed by `train`, e.g. 20240101_120000
    #[arg(long)]
    pub version: String,

    /// Latent coordinates, comma separated (x,y for a 2-D space)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub coords: Vec<f32>,

    /// Directory the artifacts were exported to
    #[arg(long, default_value = "model_files")]
    pub output_dir: String,

    /// Output PNG (default: <output-dir>/generated_<version>.png)
    #[arg(long)]
    pub out: Option<PathBuf>,
}
