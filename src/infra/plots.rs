// ============================================================
// Layer 6 — Plot Renderer
// ============================================================
// Draws the three diagnostic figures of a training invocation
// straight to PNG files, with no windowing system involved:
//
//   training_curves_{v}.png   — loss | binary accuracy per epoch
//   reconstructions_{v}.png   — originals on top, reconstructions below
//   latent_space_{v}.png      — labelled scatter of 2-D latent points
//
// Titles and labels need a font. When none is given the figures
// are drawn without text.
//
// Reference: image / imageproc crate docs

use ab_glyph::{FontVec, PxScale};
use anyhow::{ensure, Context, Result};
use image::{imageops, GrayImage, Luma, Rgb, RgbImage};
use imageproc::{
    drawing::{
        draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut,
    },
    rect::Rect,
};
use std::path::Path;

use crate::domain::{
    glyph::{GlyphImage, ImageSize},
    history::TrainingHistory,
    latent::LatentSpaceData,
};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const GRID:  Rgb<u8> = Rgb([225, 225, 225]);
const BLUE:  Rgb<u8> = Rgb([31, 119, 180]);

const PANEL_W: u32 = 500;
const PANEL_H: u32 = 400;
const MARGIN:  u32 = 48;
const TITLE_PX: f32 = 20.0;
const LABEL_PX: f32 = 14.0;

/// Each reconstruction cell is the glyph scaled up by this factor.
const CELL_SCALE: u32 = 2;
const CELL_GAP:   u32 = 4;

/// Renders figures, optionally with text.
pub struct Plotter<'a> {
    font: Option<&'a FontVec>,
}

impl<'a> Plotter<'a> {
    pub fn new(font: Option<&'a FontVec>) -> Self {
        Self { font }
    }

    /// Loss and binary accuracy side by side, one point per epoch.
    pub fn training_curves(&self, history: &TrainingHistory, path: &Path) -> Result<()> {
        ensure!(history.epochs() > 0, "history is empty, nothing to plot");

        let mut img = RgbImage::from_pixel(PANEL_W * 2, PANEL_H, WHITE);
        self.line_panel(&mut img, 0, "Loss", &history.loss);
        self.line_panel(&mut img, PANEL_W, "Binary accuracy", &history.binary_accuracy);

        save(&img, path)
    }

    /// Two-row grid: originals on the first row, reconstructions below.
    pub fn reconstructions(
        &self,
        originals:       &[GlyphImage],
        reconstructions: &[Vec<f32>],
        path:            &Path,
    ) -> Result<()> {
        ensure!(!originals.is_empty(), "no images to plot");
        ensure!(
            originals.len() == reconstructions.len(),
            "{} originals but {} reconstructions",
            originals.len(),
            reconstructions.len(),
        );

        let size   = originals[0].size();
        let cell_w = size.width as u32 * CELL_SCALE;
        let cell_h = size.height as u32 * CELL_SCALE;
        let cols   = originals.len() as u32;

        let mut canvas = GrayImage::from_pixel(
            cols * (cell_w + CELL_GAP) + CELL_GAP,
            2 * (cell_h + CELL_GAP) + CELL_GAP,
            Luma([255]),
        );

        for (col, (orig, recon)) in originals.iter().zip(reconstructions).enumerate() {
            let x = (CELL_GAP + col as u32 * (cell_w + CELL_GAP)) as i64;
            let top    = to_gray(orig.pixels(), size)?;
            let bottom = to_gray(recon, size)?;
            for (row, cell) in [top, bottom].into_iter().enumerate() {
                let cell = imageops::resize(&cell, cell_w, cell_h, imageops::FilterType::Nearest);
                let y = (CELL_GAP + row as u32 * (cell_h + CELL_GAP)) as i64;
                imageops::overlay(&mut canvas, &cell, x, y);
            }
        }

        canvas.save(path).with_context(|| format!("Cannot write '{}'", path.display()))
    }

    /// Scatter of 2-D latent points, each annotated with its label.
    pub fn latent_space(&self, data: &LatentSpaceData, path: &Path) -> Result<()> {
        ensure!(data.dims() == 2, "latent scatter needs 2 dimensions, got {}", data.dims());
        ensure!(!data.is_empty(), "no latent points to plot");

        let side = PANEL_H + 2 * MARGIN;
        let mut img = RgbImage::from_pixel(side, side, WHITE);
        let area = PlotArea::new(0, side, side);
        area.frame(&mut img);

        let xs: Vec<f32> = data.points().map(|(p, _)| p[0]).collect();
        let ys: Vec<f32> = data.points().map(|(p, _)| p[1]).collect();
        let (x0, x1) = padded_range(&xs);
        let (y0, y1) = padded_range(&ys);

        for (point, label) in data.points() {
            let px = area.x(point[0], x0, x1);
            let py = area.y(point[1], y0, y1);
            draw_filled_circle_mut(&mut img, (px as i32, py as i32), 4, BLUE);
            if let Some(font) = self.font {
                draw_text_mut(&mut img, BLACK, px as i32 + 6, py as i32 - 6,
                    PxScale::from(LABEL_PX), font, label);
            }
        }

        if let Some(font) = self.font {
            draw_text_mut(&mut img, BLACK, MARGIN as i32, (MARGIN / 3) as i32,
                PxScale::from(TITLE_PX), font, "Latent space (2D)");
        }

        save(&img, path)
    }

    fn line_panel(&self, img: &mut RgbImage, left: u32, title: &str, values: &[f64]) {
        let area = PlotArea::new(left, PANEL_W, PANEL_H);
        area.frame(img);

        let ys: Vec<f32> = values.iter().map(|v| *v as f32).collect();
        let (y0, y1) = padded_range(&ys);
        let x1 = (values.len().max(2) - 1) as f32;

        let points: Vec<(f32, f32)> = ys
            .iter()
            .enumerate()
            .map(|(i, y)| (area.x(i as f32, 0.0, x1), area.y(*y, y0, y1)))
            .collect();
        for pair in points.windows(2) {
            draw_line_segment_mut(img, pair[0], pair[1], BLUE);
        }
        if let [only] = points.as_slice() {
            draw_filled_circle_mut(img, (only.0 as i32, only.1 as i32), 2, BLUE);
        }

        if let Some(font) = self.font {
            draw_text_mut(img, BLACK, (left + MARGIN) as i32, (MARGIN / 3) as i32,
                PxScale::from(TITLE_PX), font, title);
            draw_text_mut(img, BLACK, (left + PANEL_W / 2) as i32, (PANEL_H - MARGIN / 2) as i32,
                PxScale::from(LABEL_PX), font, "epochs");
        }
    }
}

/// Write a grayscale PNG from row-major values in `[0, 1]`.
pub fn write_grayscale_png(pixels: &[f32], size: ImageSize, path: &Path) -> Result<()> {
    to_gray(pixels, size)?
        .save(path)
        .with_context(|| format!("Cannot write '{}'", path.display()))
}

/// Maps a value in `[0, 1]` to an 8-bit intensity.
pub fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn to_gray(pixels: &[f32], size: ImageSize) -> Result<GrayImage> {
    ensure!(
        pixels.len() == size.pixel_count(),
        "expected {} pixels, got {}",
        size.pixel_count(),
        pixels.len(),
    );
    let bytes = pixels.iter().map(|v| to_u8(*v)).collect();
    GrayImage::from_raw(size.width as u32, size.height as u32, bytes)
        .context("pixel buffer does not match image size")
}

fn save(img: &RgbImage, path: &Path) -> Result<()> {
    img.save(path).with_context(|| format!("Cannot write '{}'", path.display()))
}

/// Min/max of `values` widened by 5 % on each side; never zero-width.
fn padded_range(values: &[f32]) -> (f32, f32) {
    let lo = values.iter().copied().fold(f32::INFINITY, f32::min);
    let hi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let pad = ((hi - lo) * 0.05).max(1e-3);
    (lo - pad, hi + pad)
}

/// Pixel rectangle inside a panel, after margins.
struct PlotArea {
    left:   f32,
    top:    f32,
    width:  f32,
    height: f32,
}

impl PlotArea {
    fn new(panel_left: u32, panel_w: u32, panel_h: u32) -> Self {
        Self {
            left:   (panel_left + MARGIN) as f32,
            top:    MARGIN as f32,
            width:  (panel_w - 2 * MARGIN) as f32,
            height: (panel_h - 2 * MARGIN) as f32,
        }
    }

    fn x(&self, v: f32, lo: f32, hi: f32) -> f32 {
        self.left + (v - lo) / (hi - lo) * self.width
    }

    // Image rows grow downwards
    fn y(&self, v: f32, lo: f32, hi: f32) -> f32 {
        self.top + (1.0 - (v - lo) / (hi - lo)) * self.height
    }

    fn frame(&self, img: &mut RgbImage) {
        for i in 1..4 {
            let gy = self.top + self.height * i as f32 / 4.0;
            draw_line_segment_mut(img, (self.left, gy), (self.left + self.width, gy), GRID);
            let gx = self.left + self.width * i as f32 / 4.0;
            draw_line_segment_mut(img, (gx, self.top), (gx, self.top + self.height), GRID);
        }
        let rect = Rect::at(self.left as i32, self.top as i32)
            .of_size(self.width as u32, self.height as u32);
        draw_hollow_rect_mut(img, rect, BLACK);
    }
}
