//! Realm Heatmaps - position heatmaps for recorded agent episodes
//!
//! Loads episode datasets (JSON, or DAT converted on demand), selects a subset
//! by reward, episode length or final position, and renders it as a JPEG
//! heatmap served over HTTP.

// Data
pub mod constants;
pub mod episodes;
pub mod error;
pub mod files;

// Heatmap pipeline
pub mod heatmap;
pub mod selection;
pub mod service;

// Server
pub mod api;
pub mod settings;

pub use api::{AppState, router};
pub use constants::*;
pub use episodes::{
    ConversionReport, Dataset, DatasetCache, DatasetLoader, EpisodeRecord, FileDatasetLoader,
    Position, convert_dat_to_json, read_dat, read_json, sync_directory, write_dat, write_json,
};
pub use error::{HeatmapError, LoadError};
pub use files::{FileFilter, dataset_json_path, list_files};
pub use heatmap::{
    GridBounds, HeatmapGrid, HeatmapRenderer, HeatmapSummary, IntensityScale, RenderConfig,
    RenderMode, heatmap_file_name,
};
pub use selection::{Percentage, RangeType, RankKey, SelectionPolicy, select};
pub use service::{HeatmapRequest, HeatmapService, PreloadReport, RenderedHeatmap};
pub use settings::{ServerSettings, SettingsError};
