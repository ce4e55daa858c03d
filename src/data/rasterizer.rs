// ============================================================
// Layer 4 — Font Rasterizer
// ============================================================
// Renders single characters from a TrueType/OpenType font into
// binary glyph images using the ab_glyph crate.
//
// Rendering steps for one character:
//   1. Look up the glyph and scale it to `font_px` pixels
//   2. Take its pixel bounding box
//   3. Shift it so the bounding box centre lands on the
//      canvas centre (horizontal and vertical)
//   4. Walk the outline coverage; a pixel is ink when at least
//      half of it is covered
//
// Glyphs larger than the canvas are clipped at the edges.
//
// Reference: ab_glyph crate documentation

use anyhow::{Context, Result};
use ab_glyph::{point, Font, FontVec, PxScale};
use std::{fs, path::Path};

use crate::domain::glyph::{GlyphImage, ImageSize};
use crate::domain::traits::GlyphSource;

/// Coverage at or above which a pixel counts as ink
pub const INK_THRESHOLD: f32 = 0.5;

/// Renders characters from one font at one pixel size.
/// Implements the GlyphSource trait from Layer 3.
pub struct FontRasterizer {
    font:     FontVec,
    font_px:  f32,
}

impl FontRasterizer {
    /// Load a font file from disk.
    ///
    /// A missing or unreadable font is fatal for the pipeline;
    /// the error message tells the user what to put where.
    pub fn from_file(path: impl AsRef<Path>, font_px: f32) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| {
            format!(
                "Cannot load the font at '{}'. \
                 Download 'Roboto-Regular.ttf' and place it in the model directory.",
                path.display()
            )
        })?;
        let font = FontVec::try_from_vec(bytes)
            .with_context(|| format!("'{}' is not a valid TrueType/OpenType font", path.display()))?;

        tracing::info!("Loaded font '{}' at {}px", path.display(), font_px);
        Ok(Self { font, font_px })
    }

    /// The underlying font, reused by the plotter for text labels
    pub fn font(&self) -> &FontVec {
        &self.font
    }
}

impl GlyphSource for FontRasterizer {
    fn rasterize(&self, ch: char, size: ImageSize) -> Result<GlyphImage> {
        let mut image = GlyphImage::blank(size);

        let glyph = self
            .font
            .glyph_id(ch)
            .with_scale_and_position(PxScale::from(self.font_px), point(0.0, 0.0));

        // Whitespace and other outline-less glyphs stay blank
        let Some(outlined) = self.font.outline_glyph(glyph) else {
            tracing::debug!("'{}' has no outline, rendering blank", ch);
            return Ok(image);
        };

        let bounds = outlined.px_bounds();
        let left   = centre_offset(size.width,  bounds.width());
        let top    = centre_offset(size.height, bounds.height());

        outlined.draw(|x, y, coverage| {
            if is_ink(coverage) {
                image.set_ink(left + x as i64, top + y as i64);
            }
        });

        Ok(image)
    }
}

/// Offset that centres an extent of `extent` pixels on a canvas side of `side` pixels
pub fn centre_offset(side: usize, extent: f32) -> i64 {
    (side as f32 / 2.0 - extent / 2.0).round() as i64
}

pub fn is_ink(coverage: f32) -> bool {
    coverage >= INK_THRESHOLD
}
