//! Server settings
//!
//! Loaded from config/server.toml when present, otherwise built-in defaults.
//! Command line flags are applied on top by the server binary.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::constants::*;
use crate::heatmap::{IntensityScale, RenderConfig};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Directory listed by /count_dat_files and the file routes
    pub data_directory: PathBuf,
    /// Directory heatmap JPEGs are written to (created on startup)
    pub results_directory: PathBuf,
    /// Grid width in cells
    pub grid_width: u32,
    /// Grid height in cells
    pub grid_height: u32,
    /// Pixels per cell edge
    pub cell_size: u32,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    pub intensity_scale: IntensityScale,
    /// TTF/OTF font used to caption images; no caption when unset
    pub font_path: Option<PathBuf>,
    /// Convert DAT files and load every dataset before serving
    pub preload: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            data_directory: PathBuf::from(DATA_DIRECTORY),
            results_directory: PathBuf::from(HEATMAP_RESULTS_DIRECTORY),
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            cell_size: DEFAULT_CELL_SIZE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            intensity_scale: IntensityScale::default(),
            font_path: None,
            preload: false,
        }
    }
}

impl ServerSettings {
    /// Parse settings from TOML text
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from `path`. A missing file means defaults; an
    /// unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            info!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&content, path)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(SettingsError::Invalid(format!(
                "grid must be at least 1x1 cells, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if self.cell_size == 0 {
            return Err(SettingsError::Invalid("cell_size must be positive".into()));
        }
        // JPEG dimensions are limited to u16
        let max_side = u32::from(u16::MAX);
        if self.grid_width.saturating_mul(self.cell_size) > max_side
            || self.grid_height.saturating_mul(self.cell_size) > max_side
        {
            return Err(SettingsError::Invalid(format!(
                "image larger than {} pixels per side",
                max_side
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(SettingsError::Invalid(format!(
                "jpeg_quality must be 1-100, got {}",
                self.jpeg_quality
            )));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_address.parse().map_err(|_| {
            SettingsError::Invalid(format!("bad bind_address {:?}", self.bind_address))
        })
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            cell_size: self.cell_size,
            jpeg_quality: self.jpeg_quality,
            scale: self.intensity_scale,
        }
    }
}
