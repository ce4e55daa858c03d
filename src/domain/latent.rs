// ============================================================
// Layer 3 — Latent Space Types
// ============================================================
// After training, every glyph is pushed through the encoder and
// its latent point is exported together with its label:
//
//   {
//     "latent_coords": [[x0, y0], [x1, y1], ...],
//     "labels":        ["A", "B", ...]
//   }
//
// The browser front end reads this file, plots the points and
// lets the user pick any point inside a padded box around them.
// LatentBounds reproduces that box so the `generate` command
// clamps requests exactly the way the front end does.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Fraction of each axis range added on both sides
pub const PADDING_FACTOR: f32 = 0.05;

/// Fixed margin added on both sides, in latent units
pub const SLIDER_PADDING: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentSpaceData {
    pub latent_coords: Vec<Vec<f32>>,
    pub labels:        Vec<String>,
}

impl LatentSpaceData {
    pub fn new(latent_coords: Vec<Vec<f32>>, labels: Vec<String>) -> Result<Self> {
        ensure!(
            latent_coords.len() == labels.len(),
            "{} latent points but {} labels",
            latent_coords.len(), labels.len()
        );
        if let Some(first) = latent_coords.first() {
            let dims = first.len();
            ensure!(
                latent_coords.iter().all(|p| p.len() == dims),
                "latent points have inconsistent dimensionality"
            );
        }
        Ok(Self { latent_coords, labels })
    }

    pub fn is_empty(&self) -> bool {
        self.latent_coords.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.latent_coords.first().map_or(0, Vec::len)
    }

    /// Iterate (point, label) pairs in export order.
    pub fn points(&self) -> impl Iterator<Item = (&[f32], &str)> {
        self.latent_coords
            .iter()
            .map(Vec::as_slice)
            .zip(self.labels.iter().map(String::as_str))
    }
}

/// Closed interval for one latent axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min: f32,
    pub max: f32,
}

impl AxisBounds {
    pub fn clamp(&self, v: f32) -> f32 {
        v.max(self.min).min(self.max)
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

/// Padded bounding box around a set of latent points.
#[derive(Debug, Clone, PartialEq)]
pub struct LatentBounds {
    pub axes: Vec<AxisBounds>,
}

impl LatentBounds {
    /// Tight min/max per axis, without padding.
    pub fn tight(data: &LatentSpaceData) -> Result<Self> {
        ensure!(!data.is_empty(), "cannot compute bounds of an empty latent space");
        let axes = (0..data.dims())
            .map(|d| {
                let (min, max) = data.latent_coords.iter().map(|p| p[d]).fold(
                    (f32::INFINITY, f32::NEG_INFINITY),
                    |(lo, hi), v| (lo.min(v), hi.max(v)),
                );
                AxisBounds { min, max }
            })
            .collect();
        Ok(Self { axes })
    }

    /// Tight bounds widened by PADDING_FACTOR of the range plus
    /// SLIDER_PADDING on each side.
    pub fn padded(data: &LatentSpaceData) -> Result<Self> {
        let tight = Self::tight(data)?;
        let axes = tight
            .axes
            .into_iter()
            .map(|a| {
                let pad = a.span() * PADDING_FACTOR + SLIDER_PADDING;
                AxisBounds { min: a.min - pad, max: a.max + pad }
            })
            .collect();
        Ok(Self { axes })
    }

    /// Clamp every coordinate of `point` into its axis.
    pub fn clamp(&self, point: &[f32]) -> Result<Vec<f32>> {
        ensure!(
            point.len() == self.axes.len(),
            "point has {} coordinates, latent space has {}",
            point.len(), self.axes.len()
        );
        Ok(point.iter().zip(&self.axes).map(|(&v, a)| a.clamp(v)).collect())
    }
}
