// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the font file to tensor batches.
//
// The pipeline flows in this order:
//
//   font file (.ttf)
//       │
//       ▼
//   FontRasterizer    → renders one character as a binary raster
//       │
//       ▼
//   build_dataset     → one sample per character, in order
//       │
//       ▼
//   GlyphDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   GlyphBatcher      → stacks samples into [N, 1, H, W] tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Renders characters from a font file using ab_glyph
pub mod rasterizer;

/// Implements Burn's Dataset trait for glyph samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Font-free glyph source for unit tests
#[cfg(test)]
pub mod testing {
    use anyhow::Result;

    use crate::domain::glyph::{GlyphImage, ImageSize};
    use crate::domain::traits::GlyphSource;

    /// Draws a filled quarter-size block whose position depends
    /// on the character code, so different characters differ.
    pub struct BlockGlyphs;

    impl GlyphSource for BlockGlyphs {
        fn rasterize(&self, ch: char, size: ImageSize) -> Result<GlyphImage> {
            let mut img = GlyphImage::blank(size);
            let bw   = (size.width / 4).max(1);
            let bh   = (size.height / 4).max(1);
            let code = ch as usize;
            let x0   = code % (size.width - bw + 1);
            let y0   = (code / 7) % (size.height - bh + 1);
            for y in y0..y0 + bh {
                for x in x0..x0 + bw {
                    img.set_ink(x as i64, y as i64);
                }
            }
            Ok(img)
        }
    }

    /// True when every pixel is exactly 0.0 or 1.0.
    pub fn is_binary(img: &GlyphImage) -> bool {
        img.pixels().iter().all(|&p| p == 0.0 || p == 1.0)
    }
}
