//! Heatmap rasterization
//!
//! One parameterized renderer serves every selection policy: the policy
//! decides which episodes arrive here, `RenderMode` decides which of their
//! samples count.

use ab_glyph::{FontVec, PxScale};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::grid::{GridBounds, HeatmapGrid, IntensityScale, RenderMode};
use super::palette::heat_color;
use crate::constants::{BORDER_COLOR, CAPTION_COLOR, CAPTION_SCALE};
use crate::episodes::EpisodeRecord;
use crate::error::HeatmapError;
use crate::files::temp_sibling;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Grid width in cells
    pub grid_width: u32,
    /// Grid height in cells
    pub grid_height: u32,
    /// Pixels per cell edge
    pub cell_size: u32,
    pub jpeg_quality: u8,
    pub scale: IntensityScale,
}

/// What a render produced
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapSummary {
    pub path: PathBuf,
    pub episodes: usize,
    /// Samples that fell inside the frame and added weight
    pub samples_binned: usize,
    pub width: u32,
    pub height: u32,
}

pub struct HeatmapRenderer {
    config: RenderConfig,
    font: Option<FontVec>,
}

impl HeatmapRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config, font: None }
    }

    /// Renderer that captions each image using the TTF/OTF font at `path`
    pub fn with_font_file(config: RenderConfig, path: &Path) -> Result<Self, String> {
        let bytes =
            fs::read(path).map_err(|e| format!("Failed to read font {}: {}", path.display(), e))?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| format!("Failed to parse font {}: {}", path.display(), e))?;
        Ok(Self {
            config,
            font: Some(font),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Rasterize `records` into a JPEG at `out_path`.
    ///
    /// `frame` fixes the world extent; `None` fits the frame to `records`.
    /// Empty input, or input with no sample inside the frame, is a
    /// `RenderFailure` rather than a blank image. The file
    /// appears atomically, so identical concurrent renders are harmless.
    pub fn render(
        &self,
        records: &[&EpisodeRecord],
        mode: RenderMode,
        frame: Option<GridBounds>,
        out_path: &Path,
    ) -> Result<HeatmapSummary, HeatmapError> {
        if records.is_empty() {
            return Err(HeatmapError::render(out_path, "no episodes selected"));
        }

        let frame = frame
            .or_else(|| {
                GridBounds::enclosing(
                    records
                        .iter()
                        .flat_map(|record| record.positions.iter().copied()),
                )
            })
            .ok_or_else(|| HeatmapError::render(out_path, "selected episodes have no positions"))?;

        let mut grid = HeatmapGrid::new(self.config.grid_width, self.config.grid_height);
        let samples_binned = grid.accumulate(records, &frame, mode);
        if samples_binned == 0 {
            return Err(HeatmapError::render(out_path, "no samples fell inside the frame"));
        }
        let img = self.rasterize(&grid, out_path, records.len());

        write_jpeg_atomic(&img, out_path, self.config.jpeg_quality)?;

        info!(
            "Heatmap created: {} ({} episodes, {} samples)",
            out_path.display(),
            records.len(),
            samples_binned
        );
        Ok(HeatmapSummary {
            path: out_path.to_path_buf(),
            episodes: records.len(),
            samples_binned,
            width: img.width(),
            height: img.height(),
        })
    }

    fn rasterize(&self, grid: &HeatmapGrid, out_path: &Path, episodes: usize) -> RgbImage {
        let cell = self.config.cell_size;
        let mut img = RgbImage::new(grid.width() * cell, grid.height() * cell);

        let intensities = grid.intensities(self.config.scale);
        for cy in 0..grid.height() {
            for cx in 0..grid.width() {
                let value = intensities[(cy * grid.width() + cx) as usize];
                draw_filled_rect_mut(
                    &mut img,
                    Rect::at((cx * cell) as i32, (cy * cell) as i32).of_size(cell, cell),
                    heat_color(value),
                );
            }
        }

        let (w, h) = img.dimensions();
        draw_hollow_rect_mut(&mut img, Rect::at(0, 0).of_size(w, h), BORDER_COLOR);

        if let Some(font) = &self.font {
            let stem = out_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("heatmap");
            let caption = format!("{} ({} episodes)", stem, episodes);
            draw_text_mut(
                &mut img,
                CAPTION_COLOR,
                4,
                4,
                PxScale::from(CAPTION_SCALE),
                font,
                &caption,
            );
        }
        img
    }
}

/// Encode to a unique temp file beside `out_path`, then rename over it
fn write_jpeg_atomic(img: &RgbImage, out_path: &Path, quality: u8) -> Result<(), HeatmapError> {
    let parent = match out_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.is_dir() {
        return Err(HeatmapError::render(
            out_path,
            format!("output directory {} does not exist", parent.display()),
        ));
    }

    if out_path.file_name().is_none() {
        return Err(HeatmapError::render(out_path, "output path has no file name"));
    }
    let tmp_path = temp_sibling(out_path);

    let result = encode_jpeg(img, &tmp_path, quality)
        .and_then(|_| fs::rename(&tmp_path, out_path).map_err(|e| e.to_string()));
    if let Err(reason) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(HeatmapError::render(out_path, reason));
    }
    debug!("Wrote {} via {}", out_path.display(), tmp_path.display());
    Ok(())
}

fn encode_jpeg(img: &RgbImage, path: &Path, quality: u8) -> Result<(), String> {
    let file = fs::File::create(path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(img)
        .map_err(|e| e.to_string())?;
    writer.flush().map_err(|e| e.to_string())
}
