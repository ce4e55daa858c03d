// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem or other processes
// on behalf of the use cases:
//
//   exporter.rs  — Versioned artifacts
//                  History, latent data and config as JSON,
//                  model weights through Burn's recorders,
//                  and the saved-model directory for the web
//                  conversion.
//
//   plots.rs     — PNG figures
//                  Training curves, reconstruction grid and
//                  latent scatter, plus the grayscale writer
//                  used by `generate`.
//
//   converter.rs — External web-model conversion
//                  Runs the converter tool and reports the
//                  outcome without failing the run.
//
//   metrics.rs   — Training metrics logging
//                  Writes epoch-level loss and accuracy to a
//                  CSV file shared across invocations.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Versioned artifact saving and loading
pub mod exporter;

/// PNG plot rendering
pub mod plots;

/// External web-runtime conversion
pub mod converter;

/// Training metrics CSV logger
pub mod metrics;
