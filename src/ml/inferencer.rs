// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Forward passes on a trained (non-autodiff) model:
//   - encode_all:   latent point of every sample, for export
//   - reconstruct:  decoder(encoder(x)) for a few samples, for plots
//   - decode_point: one image from one latent vector, for `generate`
use anyhow::{anyhow, ensure, Result};
use burn::prelude::*;

use crate::data::batcher::stack_images;
use crate::data::dataset::GlyphSample;
use crate::ml::model::{Decoder, Encoder, GlyphAutoencoder};

/// Latent coordinates of every sample, in sample order.
pub fn encode_all<B: Backend>(
    encoder: &Encoder<B>,
    samples: &[GlyphSample],
    device:  &B::Device,
) -> Result<Vec<Vec<f32>>> {
    ensure!(!samples.is_empty(), "no samples to encode");

    let latent = encoder.forward(stack_images(samples, device));
    let [n, dims] = latent.dims();
    let flat = tensor_to_vec(latent)?;

    tracing::debug!("Encoded {} samples into {}-d latent space", n, dims);
    Ok(flat.chunks(dims).map(<[f32]>::to_vec).collect())
}

/// Reconstructions of `samples`, one flat row-major pixel vector each.
pub fn reconstruct<B: Backend>(
    model:   &GlyphAutoencoder<B>,
    samples: &[GlyphSample],
    device:  &B::Device,
) -> Result<Vec<Vec<f32>>> {
    ensure!(!samples.is_empty(), "no samples to reconstruct");

    let output = model.forward(stack_images(samples, device));
    let [_, _, h, w] = output.dims();
    let flat = tensor_to_vec(output)?;
    Ok(flat.chunks(h * w).map(<[f32]>::to_vec).collect())
}

/// Decode a single latent vector into a flat row-major pixel vector.
pub fn decode_point<B: Backend>(
    decoder: &Decoder<B>,
    point:   &[f32],
    device:  &B::Device,
) -> Result<Vec<f32>> {
    ensure!(!point.is_empty(), "latent point is empty");

    let z = Tensor::<B, 2>::from_data(TensorData::new(point.to_vec(), [1, point.len()]), device);
    tensor_to_vec(decoder.forward(z))
}

fn tensor_to_vec<B: Backend, const D: usize>(t: Tensor<B, D>) -> Result<Vec<f32>> {
    t.into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read tensor data: {e:?}"))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::data::dataset::build_dataset;
    use crate::data::testing::BlockGlyphs;
    use crate::domain::glyph::ImageSize;
    use crate::ml::model::GlyphAutoencoderConfig;

    type TestBackend = NdArray;

    #[test]
    fn test_encode_all_gives_one_point_per_sample() {
        let device  = Default::default();
        let ds      = build_dataset(&BlockGlyphs, "ABCD", ImageSize::square(16)).unwrap();
        let model   = GlyphAutoencoderConfig::new(16, 16, 2).init::<TestBackend>(&device);
        let points  = encode_all(&model.encoder, ds.samples(), &device).unwrap();
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| p.len() == 2));
    }

    #[test]
    fn test_reconstruct_keeps_pixel_count() {
        let device = Default::default();
        let ds     = build_dataset(&BlockGlyphs, "AB", ImageSize::square(16)).unwrap();
        let model  = GlyphAutoencoderConfig::new(16, 16, 2).init::<TestBackend>(&device);
        let recon  = reconstruct(&model, ds.samples(), &device).unwrap();
        assert_eq!(recon.len(), 2);
        assert!(recon.iter().all(|r| r.len() == 256));
    }

    #[test]
    fn test_decode_point_matches_full_forward() {
        let device = Default::default();
        let ds     = build_dataset(&BlockGlyphs, "A", ImageSize::square(16)).unwrap();
        let model  = GlyphAutoencoderConfig::new(16, 16, 2).init::<TestBackend>(&device);

        let z      = encode_all(&model.encoder, ds.samples(), &device).unwrap();
        let direct = decode_point(&model.decoder, &z[0], &device).unwrap();
        let full   = reconstruct(&model, ds.samples(), &device).unwrap();

        assert_eq!(direct.len(), full[0].len());
        for (a, b) in direct.iter().zip(&full[0]) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let device = Default::default();
        let model  = GlyphAutoencoderConfig::new(16, 16, 2).init::<TestBackend>(&device);
        assert!(encode_all(&model.encoder, &[], &device).is_err());
        assert!(decode_point(&model.decoder, &[], &device).is_err());
    }
}
