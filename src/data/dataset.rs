use anyhow::{ensure, Result};
use burn::data::dataset::Dataset;

use crate::domain::glyph::{GlyphImage, ImageSize};
use crate::domain::traits::GlyphSource;

/// One rendered character and its label.
/// The autoencoder's target is the image itself.
#[derive(Debug, Clone)]
pub struct GlyphSample {
    pub image: GlyphImage,
    pub label: char,
}

/// Immutable, ordered collection of glyph samples — one per character.
#[derive(Debug, Clone)]
pub struct GlyphDataset {
    samples: Vec<GlyphSample>,
}

impl GlyphDataset {
    pub fn samples(&self) -> &[GlyphSample] {
        &self.samples
    }

    pub fn labels(&self) -> Vec<String> {
        self.samples.iter().map(|s| s.label.to_string()).collect()
    }
}

impl Dataset<GlyphSample> for GlyphDataset {
    fn get(&self, index: usize) -> Option<GlyphSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Render every character of `characters`, in order, with `source`.
pub fn build_dataset(
    source:     &impl GlyphSource,
    characters: &str,
    size:       ImageSize,
) -> Result<GlyphDataset> {
    ensure!(!characters.is_empty(), "the character set is empty");

    let samples = characters
        .chars()
        .map(|label| {
            let image = source.rasterize(label, size)?;
            tracing::debug!("Rendered '{}' ({} ink pixels)", label, image.ink_count());
            Ok(GlyphSample { image, label })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        "Generated {} glyph images of {}x{}",
        samples.len(), size.width, size.height
    );
    Ok(GlyphDataset { samples })
}
