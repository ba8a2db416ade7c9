//! Heatmap generation from episode position traces
//!
//! Grid accumulation, color mapping, JPEG output and file naming.

pub mod grid;
pub mod naming;
pub mod palette;
pub mod render;

pub use grid::{GridBounds, HeatmapGrid, IntensityScale, RenderMode};
pub use naming::{heatmap_file_name, validate_dat_id};
pub use palette::heat_color;
pub use render::{HeatmapRenderer, HeatmapSummary, RenderConfig};
