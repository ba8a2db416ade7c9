//! Request orchestration: cache -> select -> render -> read back
//!
//! `HeatmapService` owns the dataset cache for the life of the server; the
//! HTTP layer shares one instance across requests.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::episodes::{ConversionReport, DatasetCache, FileDatasetLoader, sync_directory};
use crate::error::HeatmapError;
use crate::files::{FileFilter, dataset_json_path, list_files, list_paths};
use crate::heatmap::{
    HeatmapRenderer, HeatmapSummary, RenderMode, heatmap_file_name, validate_dat_id,
};
use crate::selection::{SelectionPolicy, select};
use crate::settings::ServerSettings;

/// One heatmap to build
#[derive(Debug, Clone)]
pub struct HeatmapRequest {
    pub policy: SelectionPolicy,
    pub dat_id: String,
    /// Directory holding `Data-<dat_id>.json`
    pub data_root: PathBuf,
}

/// Rendered image as written to the results directory
#[derive(Debug, Clone)]
pub struct RenderedHeatmap {
    /// File name inside the results directory
    pub name: String,
    /// JPEG bytes read back from disk
    pub bytes: Vec<u8>,
    pub summary: HeatmapSummary,
}

/// Outcome of converting and loading the data directory at startup
#[derive(Debug, Default)]
pub struct PreloadReport {
    pub conversion: ConversionReport,
    pub loaded: usize,
    pub failures: Vec<HeatmapError>,
}

pub struct HeatmapService {
    cache: DatasetCache,
    renderer: HeatmapRenderer,
    data_directory: PathBuf,
    results_directory: PathBuf,
}

/// Final-position policies weight one sample per episode, the rest every sample
pub fn render_mode_for(policy: &SelectionPolicy) -> RenderMode {
    match policy {
        SelectionPolicy::ByLastPosition => RenderMode::FinalPositions,
        SelectionPolicy::All | SelectionPolicy::Ranked { .. } => RenderMode::Samples,
    }
}

impl HeatmapService {
    pub fn new(
        cache: DatasetCache,
        renderer: HeatmapRenderer,
        data_directory: impl Into<PathBuf>,
        results_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cache,
            renderer,
            data_directory: data_directory.into(),
            results_directory: results_directory.into(),
        }
    }

    /// Build the service described by `settings`, creating the results directory
    pub fn from_settings(settings: &ServerSettings) -> Result<Self, String> {
        fs::create_dir_all(&settings.results_directory).map_err(|e| {
            format!(
                "Failed to create {}: {}",
                settings.results_directory.display(),
                e
            )
        })?;

        let config = settings.render_config();
        let renderer = match &settings.font_path {
            Some(font) => HeatmapRenderer::with_font_file(config, font)?,
            None => HeatmapRenderer::new(config),
        };

        Ok(Self::new(
            DatasetCache::new(FileDatasetLoader),
            renderer,
            &settings.data_directory,
            &settings.results_directory,
        ))
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    pub fn results_directory(&self) -> &Path {
        &self.results_directory
    }

    pub fn create_heatmap(&self, request: &HeatmapRequest) -> Result<RenderedHeatmap, HeatmapError> {
        validate_dat_id(&request.dat_id)?;

        let dataset_path = dataset_json_path(&request.data_root, &request.dat_id);
        let dataset = self.cache.get_or_load(&dataset_path)?;

        let selected = select(dataset.episodes(), &request.policy);
        let name = heatmap_file_name(&request.policy, &request.dat_id);
        let out_path = self.results_directory.join(&name);

        let summary = self.renderer.render(
            &selected,
            render_mode_for(&request.policy),
            dataset.bounds(),
            &out_path,
        )?;

        let bytes = fs::read(&out_path)
            .map_err(|e| HeatmapError::render(&out_path, format!("read back failed: {}", e)))?;

        Ok(RenderedHeatmap {
            name,
            bytes,
            summary,
        })
    }

    pub fn count_dat_files(&self) -> usize {
        self.list_files(FileFilter::Dat).len()
    }

    pub fn list_files(&self, filter: FileFilter) -> Vec<String> {
        list_files(&self.data_directory, filter)
    }

    /// Convert DAT files lacking JSON, then load every JSON dataset
    pub fn preload_data_directory(&self) -> PreloadReport {
        let conversion = sync_directory(&self.data_directory);
        if !conversion.is_clean() {
            warn!(
                "{} DAT files could not be converted",
                conversion.failed.len()
            );
        }

        let failures = self
            .cache
            .preload(list_paths(&self.data_directory, FileFilter::Json));
        let loaded = self.cache.len();
        info!(
            "Preloaded {} datasets from {} ({} converted, {} failed)",
            loaded,
            self.data_directory.display(),
            conversion.converted.len(),
            failures.len()
        );

        PreloadReport {
            conversion,
            loaded,
            failures,
        }
    }
}
