//! Occupancy grid accumulated from episode position samples

use serde::{Deserialize, Serialize};

use crate::constants::DEGENERATE_EXTENT_PADDING;
use crate::episodes::{EpisodeRecord, Position};

/// World-space rectangle mapped onto the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl GridBounds {
    /// Smallest bounds holding every finite position, `None` if there are none.
    /// Axes with zero extent are padded so every sample maps to a cell.
    pub fn enclosing(positions: impl IntoIterator<Item = Position>) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for p in positions {
            if !p.x.is_finite() || !p.y.is_finite() {
                continue;
            }
            bounds = Some(match bounds {
                None => Self {
                    min_x: p.x,
                    max_x: p.x,
                    min_y: p.y,
                    max_y: p.y,
                },
                Some(b) => Self {
                    min_x: b.min_x.min(p.x),
                    max_x: b.max_x.max(p.x),
                    min_y: b.min_y.min(p.y),
                    max_y: b.max_y.max(p.y),
                },
            });
        }
        bounds.map(Self::padded)
    }

    fn padded(self) -> Self {
        let (min_x, max_x) = pad_axis(self.min_x, self.max_x);
        let (min_y, max_y) = pad_axis(self.min_y, self.max_y);
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Widen a zero-extent axis. The pad scales with magnitude so it survives
/// f32 rounding at large coordinates.
fn pad_axis(min: f32, max: f32) -> (f32, f32) {
    if max - min > f32::EPSILON * max.abs().max(min.abs()).max(1.0) {
        return (min, max);
    }
    let pad = DEGENERATE_EXTENT_PADDING.max(min.abs().max(max.abs()) * f32::EPSILON * 4.0);
    (min - pad, max + pad)
}

/// Which samples of a selected episode add weight to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Every position sample adds one
    Samples,
    /// Only the episode's final position adds one
    FinalPositions,
}

/// How cell counts are mapped to 0..1 intensity
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum IntensityScale {
    Linear,
    /// `ln(1 + n) / ln(1 + max)`; keeps sparse regions visible next to hotspots
    #[default]
    Log,
}

#[derive(Debug, Clone)]
pub struct HeatmapGrid {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl HeatmapGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, cx: u32, cy: u32) -> usize {
        (cy * self.width + cx) as usize
    }

    pub fn get(&self, cx: u32, cy: u32) -> f32 {
        self.values[self.index(cx, cy)]
    }

    fn add(&mut self, cx: u32, cy: u32, weight: f32) {
        let idx = self.index(cx, cy);
        self.values[idx] += weight;
    }

    pub fn max(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }

    pub fn total(&self) -> f32 {
        self.values.iter().sum()
    }

    /// Cell holding `p`; row 0 is the top (largest y). Points outside the
    /// frame or non-finite return `None`.
    pub fn world_to_cell(&self, bounds: &GridBounds, p: Position) -> Option<(u32, u32)> {
        if !p.x.is_finite() || !p.y.is_finite() {
            return None;
        }
        let fx = (p.x - bounds.min_x) / bounds.width();
        let fy = (bounds.max_y - p.y) / bounds.height();
        if !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy) {
            return None;
        }
        // The max edge belongs to the last cell
        let cx = ((fx * self.width as f32) as u32).min(self.width - 1);
        let cy = ((fy * self.height as f32) as u32).min(self.height - 1);
        Some((cx, cy))
    }

    /// Accumulate weight from `records`, returning how many samples landed
    pub fn accumulate(
        &mut self,
        records: &[&EpisodeRecord],
        bounds: &GridBounds,
        mode: RenderMode,
    ) -> usize {
        let mut binned = 0;
        for record in records {
            let samples: &[Position] = match mode {
                RenderMode::Samples => &record.positions,
                RenderMode::FinalPositions => match record.positions.last() {
                    Some(last) => std::slice::from_ref(last),
                    None => &[],
                },
            };
            for &p in samples {
                if let Some((cx, cy)) = self.world_to_cell(bounds, p) {
                    self.add(cx, cy, 1.0);
                    binned += 1;
                }
            }
        }
        binned
    }

    /// Every cell mapped to 0..1 relative to the hottest cell, row-major
    pub fn intensities(&self, scale: IntensityScale) -> Vec<f32> {
        let max = self.max();
        if max <= 0.0 {
            return vec![0.0; self.values.len()];
        }
        let log_max = (1.0 + max).ln();
        self.values
            .iter()
            .map(|&value| {
                match scale {
                    IntensityScale::Linear => value / max,
                    IntensityScale::Log => (1.0 + value).ln() / log_max,
                }
                .clamp(0.0, 1.0)
            })
            .collect()
    }
}
