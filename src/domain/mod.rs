// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits that describe the concepts of
// the pipeline: glyph rasters, training history and latent
// coordinates.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A binary glyph raster and its dimensions
pub mod glyph;

// Per-epoch metric series accumulated across training runs
pub mod history;

// Latent coordinates, labels and the padded bounds around them
pub mod latent;

// Core abstractions (traits) that other layers implement
pub mod traits;
