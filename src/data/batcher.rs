// ============================================================
// Layer 4 — Glyph Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<GlyphSample>
// into a single image tensor.
//
// How batching works here:
//   Input:  Vec of N GlyphSamples, each H*W pixels (row-major)
//   Output: GlyphBatch with a tensor of shape [N, 1, H, W]
//
//   All pixels are flattened into one long Vec in sample order,
//   then wrapped as TensorData with the 4-D shape directly.
//
// There is no separate target tensor: an autoencoder learns to
// reproduce its input, so the images are also the labels.
//
// Reference: Burn Book §4 (Batcher)

use std::marker::PhantomData;

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::GlyphSample;

// ─── GlyphBatch ───────────────────────────────────────────────────────────────
/// A batch of glyph images ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct GlyphBatch<B: Backend> {
    /// Binary images — shape: [batch_size, 1, height, width]
    pub images: Tensor<B, 4>,
}

// ─── GlyphBatcher ─────────────────────────────────────────────────────────────
/// Stateless batcher; the backend parameter pins which backend
/// the data loader produces tensors for.
#[derive(Clone, Debug)]
pub struct GlyphBatcher<B: Backend> {
    _backend: PhantomData<B>,
}

impl<B: Backend> GlyphBatcher<B> {
    pub fn new() -> Self {
        Self { _backend: PhantomData }
    }
}

impl<B: Backend> Default for GlyphBatcher<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Batcher<B, GlyphSample, GlyphBatch<B>> for GlyphBatcher<B> {
    fn batch(&self, items: Vec<GlyphSample>, device: &B::Device) -> GlyphBatch<B> {
        GlyphBatch { images: stack_images(&items, device) }
    }
}

/// Stack sample images into a [N, 1, H, W] tensor.
/// Shared by the batcher and by the inference helpers.
pub fn stack_images<B: Backend>(samples: &[GlyphSample], device: &B::Device) -> Tensor<B, 4> {
    // All images share the dataset's size
    let size = samples[0].image.size();

    let flat: Vec<f32> = samples
        .iter()
        .flat_map(|s| s.image.pixels().iter().copied())
        .collect();

    Tensor::from_data(
        TensorData::new(flat, [samples.len(), 1, size.height, size.width]),
        device,
    )
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::data::dataset::build_dataset;
    use crate::data::testing::BlockGlyphs;
    use crate::domain::glyph::ImageSize;

    type TestBackend = NdArray;

    #[test]
    fn test_batch_shape() {
        let ds      = build_dataset(&BlockGlyphs, "ABC", ImageSize::new(16, 8)).unwrap();
        let device  = Default::default();
        let batcher = GlyphBatcher::<TestBackend>::new();
        let batch   = batcher.batch(ds.samples().to_vec(), &device);
        assert_eq!(batch.images.dims(), [3, 1, 8, 16]);
    }

    #[test]
    fn test_pixels_keep_row_major_layout() {
        let ds     = build_dataset(&BlockGlyphs, "A", ImageSize::square(16)).unwrap();
        let device = Default::default();
        let t      = stack_images::<TestBackend>(ds.samples(), &device);
        let back: Vec<f32> = t.into_data().to_vec().unwrap();
        assert_eq!(back.as_slice(), ds.samples()[0].image.pixels());
    }
}
