// ============================================================
// Layer 3 — Glyph Domain Types
// ============================================================
// A glyph image is a fixed-size, single-channel raster whose
// pixels are either 0.0 (background) or 1.0 (ink).
//
// Pixels are stored row-major:
//   index = y * width + x
//
// The same layout is used when the batcher stacks images into
// a [batch, 1, height, width] tensor, so no transposition is
// ever needed between the two.

use serde::{Deserialize, Serialize};

/// Width and height of a raster in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width:  usize,
    pub height: usize,
}

impl ImageSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn square(side: usize) -> Self {
        Self::new(side, side)
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// One rendered character as a binary raster.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphImage {
    size:   ImageSize,
    pixels: Vec<f32>,
}

impl GlyphImage {
    /// An all-background image.
    pub fn blank(size: ImageSize) -> Self {
        Self { size, pixels: vec![0.0; size.pixel_count()] }
    }

    /// Mark (x, y) as ink. Coordinates outside the canvas are clipped.
    pub fn set_ink(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.size.width && y < self.size.height {
            self.pixels[y * self.size.width + x] = 1.0;
        }
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p == 1.0).count()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_image_has_no_ink() {
        let img = GlyphImage::blank(ImageSize::square(8));
        assert_eq!(img.pixels().len(), 64);
        assert_eq!(img.ink_count(), 0);
    }

    #[test]
    fn test_set_ink_clips_outside_canvas() {
        let mut img = GlyphImage::blank(ImageSize::new(4, 3));
        img.set_ink(1, 2);
        img.set_ink(-1, 0);
        img.set_ink(4, 0);
        img.set_ink(0, 3);
        assert_eq!(img.ink_count(), 1);
        // row-major: index = y * width + x
        assert_eq!(img.pixels()[2 * 4 + 1], 1.0);
    }
}
