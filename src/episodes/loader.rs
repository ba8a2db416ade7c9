//! Dataset loading from disk

use std::path::Path;
use tracing::info;

use super::convert::convert_dat_to_json;
use super::dat::read_dat;
use super::json::read_json;
use super::record::EpisodeRecord;
use crate::error::LoadError;
use crate::files::sibling_with_extension;

/// Turns a dataset key into episode records.
///
/// An empty `Ok` is a valid parse; the cache decides that an empty dataset
/// cannot be rendered.
pub trait DatasetLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<EpisodeRecord>, LoadError>;
}

/// Loads `.json` and `.dat` recorder files.
///
/// A missing `X.json` with an existing `X.dat` beside it is converted first.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDatasetLoader;

impl FileDatasetLoader {
    fn load_json(&self, path: &Path) -> Result<Vec<EpisodeRecord>, LoadError> {
        if !path.exists() {
            let dat = sibling_with_extension(path, "dat");
            if dat.is_file() {
                info!("{} missing, converting from {}", path.display(), dat.display());
                convert_dat_to_json(&dat, path)?;
            }
        }
        read_json(path)
    }
}

impl DatasetLoader for FileDatasetLoader {
    fn load(&self, path: &Path) -> Result<Vec<EpisodeRecord>, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => self.load_json(path),
            Some("dat") => read_dat(path),
            _ => Err(LoadError::Malformed(format!(
                "unsupported dataset extension: {}",
                path.display()
            ))),
        }
    }
}
