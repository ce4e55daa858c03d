// ============================================================
// Layer 2 — Generate Use Case
// ============================================================
// Decodes one point of a trained latent space into a glyph image:
//   1. Load the config, decoder and latent data of one version
//   2. Clamp the requested point into the padded latent bounds
//      (the same box the browser front end offers its sliders in)
//   3. Decode it on the CPU and write a grayscale PNG

use anyhow::{ensure, Result};
use burn::backend::{ndarray::NdArrayDevice, NdArray};
use std::path::PathBuf;

use crate::domain::latent::LatentBounds;
use crate::infra::{exporter::ArtifactStore, plots::write_grayscale_png};
use crate::ml::inferencer::decode_point;

type InferBackend = NdArray;

/// Result of a `generate` call.
#[derive(Debug, Clone)]
pub struct GeneratedGlyph {
    pub path:    PathBuf,
    /// The point actually decoded, after clamping
    pub point:   Vec<f32>,
    pub clamped: bool,
}

pub struct GenerateUseCase {
    store: ArtifactStore,
}

impl GenerateUseCase {
    pub fn new(output_dir: impl Into<PathBuf>, version: impl Into<String>) -> Result<Self> {
        let store = ArtifactStore::open(output_dir.into(), version)?;
        Ok(Self { store })
    }

    /// Decode `coords` and write the image to `out`, or to
    /// `generated_{version}.png` in the output directory.
    pub fn execute(&self, coords: &[f32], out: Option<PathBuf>) -> Result<GeneratedGlyph> {
        let cfg    = self.store.load_config()?;
        let latent = self.store.load_latent()?;
        ensure!(
            coords.len() == cfg.latent_dims,
            "expected {} coordinates for version '{}', got {}",
            cfg.latent_dims, self.store.version(), coords.len()
        );

        let bounds  = LatentBounds::padded(&latent)?;
        let point   = bounds.clamp(coords)?;
        let clamped = point.as_slice() != coords;
        if clamped {
            tracing::warn!("Point {:?} is outside the latent bounds, using {:?}", coords, point);
        }

        let device  = NdArrayDevice::Cpu;
        let decoder = self.store.load_decoder::<InferBackend>(&cfg.model_config(), &device)?;
        let pixels  = decode_point(&decoder, &point, &device)?;

        let path = out.unwrap_or_else(|| self.store.versioned_file("generated", "png"));
        write_grayscale_png(&pixels, cfg.image_dims(), &path)?;
        tracing::info!("Generated glyph written to '{}'", path.display());

        Ok(GeneratedGlyph { path, point, clamped })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use crate::domain::latent::LatentSpaceData;

    const VERSION: &str = "20240101_120000";

    /// Writes the three artifacts `generate` reads, from an untrained model.
    fn export_fixture(dir: &std::path::Path) {
        let store = ArtifactStore::new(dir, VERSION).unwrap();
        let cfg   = TrainConfig { image_size: 16, ..TrainConfig::default() };
        let model = cfg.model_config().init::<InferBackend>(&NdArrayDevice::Cpu);

        store.save_config(&cfg).unwrap();
        store.save_models(&model).unwrap();
        store
            .save_latent(
                &LatentSpaceData::new(
                    vec![vec![-1.0, 0.0], vec![1.0, 2.0]],
                    vec!["A".into(), "B".into()],
                )
                .unwrap(),
            )
            .unwrap();
    }

    #[test]
    fn test_generate_writes_png_of_image_size() {
        let tmp = tempfile::tempdir().unwrap();
        export_fixture(tmp.path());

        let glyph = GenerateUseCase::new(tmp.path(), VERSION)
            .unwrap()
            .execute(&[0.0, 1.0], None)
            .unwrap();

        assert!(!glyph.clamped);
        assert_eq!(glyph.path, tmp.path().join(format!("generated_{VERSION}.png")));
        let img = image::open(&glyph.path).unwrap();
        assert_eq!((img.width(), img.height()), (16, 16));
    }

    #[test]
    fn test_out_of_range_point_is_clamped() {
        let tmp = tempfile::tempdir().unwrap();
        export_fixture(tmp.path());

        let out   = tmp.path().join("far.png");
        let glyph = GenerateUseCase::new(tmp.path(), VERSION)
            .unwrap()
            .execute(&[100.0, -100.0], Some(out.clone()))
            .unwrap();

        // x in [-1, 1]  → pad 0.1 + 5.0 → max  6.1
        // y in [ 0, 2]  → pad 0.1 + 5.0 → min -5.1
        assert!(glyph.clamped);
        assert!((glyph.point[0] - 6.1).abs() < 1e-5);
        assert!((glyph.point[1] + 5.1).abs() < 1e-5);
        assert!(out.exists());
    }

    #[test]
    fn test_wrong_dimensionality_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        export_fixture(tmp.path());
        let uc = GenerateUseCase::new(tmp.path(), VERSION).unwrap();
        assert!(uc.execute(&[0.0], None).is_err());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        export_fixture(tmp.path());
        let uc = GenerateUseCase::new(tmp.path(), "19990101_000000").unwrap();
        assert!(uc.execute(&[0.0, 0.0], None).is_err());
    }
}
