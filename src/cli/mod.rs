// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — renders the alphabet, trains, plots and exports
//   2. `generate` — decodes one latent point of an exported version
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, GenerateArgs, TrainArgs};

/// The main CLI struct
#[derive(Parser, Debug)]
#[command(
    name = "glyph-cae",
    version = "0.1.0",
    about = "Train a convolutional autoencoder on font glyphs and export its latent space."
)]
pub struct Cli {
    /// The subcommand to run (train or generate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Generate(args) => run_generate(args),
        }
    }
}

/// Handles the `train` subcommand.
fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on '{}' with font '{}'", args.characters, args.font);

    let report = TrainUseCase::new(args.into()).execute()?;

    println!("\nTraining complete. Artifacts saved with version {}", report.version);
    if let (Some(loss), Some(acc)) = (report.history.last_loss(), report.history.last_accuracy()) {
        println!("Final loss: {loss:.4}, binary accuracy: {acc:.4}");
    }
    match &report.conversion {
        Some(outcome) if outcome.is_success() => println!("Web conversion: {outcome}"),
        Some(outcome) => println!("Error: web conversion failed: {outcome}"),
        None => println!("Web conversion skipped."),
    }
    Ok(())
}

/// Handles the `generate` subcommand.
fn run_generate(args: GenerateArgs) -> Result<()> {
    use crate::application::generate_use_case::GenerateUseCase;

    let glyph = GenerateUseCase::new(&args.output_dir, &args.version)?
        .execute(&args.coords, args.out)?;

    if glyph.clamped {
        println!("Point clamped to {:?}", glyph.point);
    }
    println!("Glyph written to {}", glyph.path.display());
    Ok(())
}
