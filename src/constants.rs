//! Defaults for the heatmap service
//!
//! Directory layout, grid geometry and palette values live here so the
//! settings defaults and the renderer agree on one source of truth.

use image::Rgb;

// =============================================================================
// DIRECTORIES
// =============================================================================

/// Where recorder datasets (Data-N.dat / Data-N.json) are listed from
pub const DATA_DIRECTORY: &str = "analysis/data";
/// Where rendered heatmap JPEGs are written
pub const HEATMAP_RESULTS_DIRECTORY: &str = "analysis/heatmaps";
/// Optional TOML settings file
pub const SETTINGS_FILE: &str = "config/server.toml";

/// Dataset files are named `Data-<dat_id>.<ext>`
pub const DATASET_FILE_PREFIX: &str = "Data-";

// =============================================================================
// SERVER
// =============================================================================

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";

// =============================================================================
// GRID / IMAGE
// =============================================================================

pub const DEFAULT_GRID_WIDTH: u32 = 64; // cells
pub const DEFAULT_GRID_HEIGHT: u32 = 64; // cells
pub const DEFAULT_CELL_SIZE: u32 = 8; // pixels per cell
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Extent used for an axis whose samples all share one coordinate
pub const DEGENERATE_EXTENT_PADDING: f32 = 0.5;

/// Caption text height in pixels
pub const CAPTION_SCALE: f32 = 16.0;

// =============================================================================
// COLORS
// =============================================================================

/// Cells nobody visited
pub const BACKGROUND_COLOR: Rgb<u8> = Rgb([18, 18, 28]);
pub const BORDER_COLOR: Rgb<u8> = Rgb([90, 90, 110]);
pub const CAPTION_COLOR: Rgb<u8> = Rgb([235, 235, 235]);

/// Heat gradient stops from coldest to hottest
pub const HEAT_STOPS: [Rgb<u8>; 5] = [
    Rgb([20, 40, 160]),  // Blue
    Rgb([0, 170, 210]),  // Cyan
    Rgb([40, 190, 60]),  // Green
    Rgb([240, 220, 40]), // Yellow
    Rgb([220, 30, 20]),  // Red
];
