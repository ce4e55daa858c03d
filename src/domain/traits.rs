// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The dataset generator only needs "something that turns a
// character into a binary raster". Programming against that
// trait lets the pipeline use a real font file while the tests
// use a synthetic source that needs no font on disk.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::glyph::{GlyphImage, ImageSize};

// ─── GlyphSource ──────────────────────────────────────────────────────────────
/// Any component that can render a single character.
///
/// Implementations:
///   - FontRasterizer → renders with a TrueType/OpenType font
pub trait GlyphSource {
    /// Render `ch` centred on a `size` canvas as a binary image.
    fn rasterize(&self, ch: char, size: ImageSize) -> Result<GlyphImage>;
}
