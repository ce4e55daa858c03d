// ============================================================
// Layer 6 — Artifact Exporter
// ============================================================
// Saves and restores everything one training invocation produces.
// Every file carries the same version string so artifacts from
// different invocations never overwrite each other.
//
// What gets saved per version:
//   1. cae_autoencoder_{v}.json      — accumulated training history
//   2. cae_autoencoder_{v}.*         — full autoencoder weights
//   3. cae_encoder_{v}.*             — encoder weights
//   4. cae_decoder_{v}.*             — decoder weights
//   5. cae_config_{v}.json           — training configuration
//   6. latent_space_data_{v}.json    — latent coordinates + labels
//   7. cae_decoder_saved_model_{v}/  — decoder.json + topology.json,
//                                      input of the web conversion
//
// Weights go through Burn's CompactRecorder, which picks its own
// file extension. The decoder is written a second time with the
// full-precision pretty JSON recorder so external tooling can read
// it without knowing Burn's binary format.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{ensure, Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, FullPrecisionSettings, PrettyJsonFileRecorder, Recorder},
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::{history::TrainingHistory, latent::LatentSpaceData};
use crate::ml::model::{Decoder, DecoderTopology, GlyphAutoencoder, GlyphAutoencoderConfig};

const HISTORY_STEM:     &str = "cae_autoencoder";
const AUTOENCODER_STEM: &str = "cae_autoencoder";
const ENCODER_STEM:     &str = "cae_encoder";
const DECODER_STEM:     &str = "cae_decoder";
const CONFIG_STEM:      &str = "cae_config";
const LATENT_STEM:      &str = "latent_space_data";
const SAVED_MODEL_STEM: &str = "cae_decoder_saved_model";
const WEB_MODEL_STEM:   &str = "tfjs_decoder_model";

/// Reads and writes the versioned artifacts of one invocation.
pub struct ArtifactStore {
    dir:     PathBuf,
    version: String,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>, version: impl Into<String>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir, version: version.into() })
    }

    /// Open the artifacts of an earlier invocation. The directory must exist.
    pub fn open(dir: impl AsRef<Path>, version: impl Into<String>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        ensure!(
            dir.is_dir(),
            "Output directory '{}' does not exist. Have you run 'train' first?",
            dir.display()
        );
        Ok(Self { dir, version: version.into() })
    }

    /// A new `YYYYmmdd_HHMMSS` version from the local clock.
    pub fn timestamp_version() -> String {
        chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{dir}/{stem}_{version}`, without extension.
    pub fn versioned(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}_{}", self.version))
    }

    /// `{dir}/{stem}_{version}.{ext}`
    pub fn versioned_file(&self, stem: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{stem}_{}.{ext}", self.version))
    }

    // ── JSON documents ───────────────────────────────────────────────────────

    pub fn save_history(&self, history: &TrainingHistory) -> Result<PathBuf> {
        let path = self.versioned_file(HISTORY_STEM, "json");
        write_json(&path, history, false)?;
        tracing::info!("History saved to '{}'", path.display());
        Ok(path)
    }

    pub fn save_latent(&self, data: &LatentSpaceData) -> Result<PathBuf> {
        let path = self.versioned_file(LATENT_STEM, "json");
        write_json(&path, data, true)?;
        tracing::info!("Latent space data saved to '{}'", path.display());
        Ok(path)
    }

    pub fn load_latent(&self) -> Result<LatentSpaceData> {
        let data: LatentSpaceData = read_json(&self.versioned_file(LATENT_STEM, "json"))?;
        // Re-check the invariants serde cannot express
        LatentSpaceData::new(data.latent_coords, data.labels)
    }

    /// Save the training configuration so the decoder can be rebuilt later.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<PathBuf> {
        let path = self.versioned_file(CONFIG_STEM, "json");
        write_json(&path, cfg, true)?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(path)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.versioned_file(CONFIG_STEM, "json");
        read_json(&path).with_context(|| {
            format!("Make sure 'train' produced version '{}' first.", self.version)
        })
    }

    // ── Model weights ────────────────────────────────────────────────────────

    /// Save the autoencoder, encoder and decoder as three separate records.
    pub fn save_models<B: Backend>(&self, model: &GlyphAutoencoder<B>) -> Result<()> {
        let recorder = CompactRecorder::new();

        let path = self.versioned(AUTOENCODER_STEM);
        recorder
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save autoencoder to '{}'", path.display()))?;
        tracing::info!("Autoencoder saved to '{}'", path.display());

        let path = self.versioned(ENCODER_STEM);
        recorder
            .record(model.encoder.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save encoder to '{}'", path.display()))?;
        tracing::info!("Encoder saved to '{}'", path.display());

        let path = self.versioned(DECODER_STEM);
        recorder
            .record(model.decoder.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save decoder to '{}'", path.display()))?;
        tracing::info!("Decoder saved to '{}'", path.display());

        Ok(())
    }

    /// Rebuild the decoder described by `model_cfg` and load its weights.
    pub fn load_decoder<B: Backend>(
        &self,
        model_cfg: &GlyphAutoencoderConfig,
        device:    &B::Device,
    ) -> Result<Decoder<B>> {
        let path = self.versioned(DECODER_STEM);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load decoder '{}'. Have you trained the model first?",
                    path.display())
            })?;
        Ok(model_cfg.init_decoder::<B>(device).load_record(record))
    }

    // ── Web conversion input ─────────────────────────────────────────────────

    /// Directory handed to the external converter.
    pub fn saved_model_dir(&self) -> PathBuf {
        self.versioned(SAVED_MODEL_STEM)
    }

    /// Directory the external converter writes into.
    pub fn web_model_dir(&self) -> PathBuf {
        self.versioned(WEB_MODEL_STEM)
    }

    /// Write the decoder as `decoder.json` (full precision) next to a
    /// `topology.json` describing its layer stack.
    pub fn save_web_decoder<B: Backend>(
        &self,
        decoder:  &Decoder<B>,
        topology: &DecoderTopology,
    ) -> Result<PathBuf> {
        let dir = self.saved_model_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        PrettyJsonFileRecorder::<FullPrecisionSettings>::new()
            .record(decoder.clone().into_record(), dir.join("decoder"))
            .with_context(|| format!("Failed to write decoder weights in '{}'", dir.display()))?;
        write_json(&dir.join("topology.json"), topology, true)?;

        tracing::info!("Decoder saved model written to '{}'", dir.display());
        Ok(dir)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    fs::write(path, json).with_context(|| format!("Cannot write '{}'", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Malformed JSON in '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::ml::inferencer::decode_point;

    type TestBackend = NdArray;

    fn store(dir: &Path) -> ArtifactStore {
        ArtifactStore::new(dir, "20240101_120000").unwrap()
    }

    #[test]
    fn test_file_names_carry_version() {
        let tmp = tempfile::tempdir().unwrap();
        let s   = store(tmp.path());
        assert_eq!(
            s.versioned_file("latent_space_data", "json"),
            tmp.path().join("latent_space_data_20240101_120000.json"),
        );
        assert_eq!(
            s.web_model_dir(),
            tmp.path().join("tfjs_decoder_model_20240101_120000"),
        );
    }

    #[test]
    fn test_timestamp_version_format() {
        let v = ArtifactStore::timestamp_version();
        assert_eq!(v.len(), 15);
        assert_eq!(&v[8..9], "_");
        assert!(v.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_history_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let s   = store(tmp.path());
        let mut h = TrainingHistory::new();
        h.push(0.69, 0.5);
        h.push(0.31, 0.91);

        let path = s.save_history(&h).unwrap();
        let back: TrainingHistory = read_json(&path).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn test_latent_round_trip_is_pretty() {
        let tmp  = tempfile::tempdir().unwrap();
        let s    = store(tmp.path());
        let data = LatentSpaceData::new(
            vec![vec![1.5, -2.0], vec![0.25, 3.0]],
            vec!["A".into(), "B".into()],
        )
        .unwrap();

        let path = s.save_latent(&data).unwrap();
        assert!(fs::read_to_string(path).unwrap().contains('\n'));
        assert_eq!(s.load_latent().unwrap(), data);
    }

    #[test]
    fn test_config_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let s   = store(tmp.path());
        let cfg = TrainConfig { latent_dims: 3, epochs: 7, ..TrainConfig::default() };

        s.save_config(&cfg).unwrap();
        let loaded = s.load_config().unwrap();
        assert_eq!(loaded.latent_dims, 3);
        assert_eq!(loaded.epochs, 7);
        assert_eq!(loaded.characters, cfg.characters);
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(store(tmp.path()).load_config().is_err());
    }

    #[test]
    fn test_saved_decoder_reloads() {
        let tmp    = tempfile::tempdir().unwrap();
        let s      = store(tmp.path());
        let device = Default::default();
        let cfg    = GlyphAutoencoderConfig::new(16, 16, 2);
        let model  = cfg.init::<TestBackend>(&device);

        s.save_models(&model).unwrap();
        let names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        for stem in ["cae_autoencoder_", "cae_encoder_", "cae_decoder_"] {
            assert!(names.iter().any(|n| n.starts_with(stem)), "missing {stem}");
        }

        let loaded = s.load_decoder::<TestBackend>(&cfg, &device).unwrap();
        let a = decode_point(&model.decoder, &[0.5, -1.0], &device).unwrap();
        let b = decode_point(&loaded, &[0.5, -1.0], &device).unwrap();
        // CompactRecorder stores half precision
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-2);
        }
    }

    #[test]
    fn test_web_decoder_directory() {
        let tmp    = tempfile::tempdir().unwrap();
        let s      = store(tmp.path());
        let device = Default::default();
        let cfg    = GlyphAutoencoderConfig::new(16, 16, 2);
        let model  = cfg.init::<TestBackend>(&device);

        let dir = s.save_web_decoder(&model.decoder, &cfg.decoder_topology()).unwrap();
        assert!(dir.join("decoder.json").exists());

        let topo: DecoderTopology = read_json(&dir.join("topology.json")).unwrap();
        assert_eq!(topo, cfg.decoder_topology());
    }
}
