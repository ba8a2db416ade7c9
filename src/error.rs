//! Error taxonomy shared by the loader, selector, renderer and HTTP layer

use std::path::PathBuf;

use thiserror::Error;

/// Why a dataset file could not be turned into episode records
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found")]
    Missing,
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed data: {0}")]
    Malformed(String),
    #[error("dataset contains no episodes")]
    Empty,
}

impl LoadError {
    /// Classify an I/O error, keeping "not found" distinct from other failures
    pub fn from_io(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::Missing
        } else {
            Self::Io(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum HeatmapError {
    #[error("failed to load {}: {source}", path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("failed to render {}: {reason}", path.display())]
    RenderFailure { path: PathBuf, reason: String },
}

impl HeatmapError {
    pub fn load(path: impl Into<PathBuf>, source: LoadError) -> Self {
        Self::LoadFailure {
            path: path.into(),
            source,
        }
    }

    pub fn render(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::RenderFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_missing() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(LoadError::from_io(err), LoadError::Missing));

        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(LoadError::from_io(err), LoadError::Io(_)));
    }

    #[test]
    fn test_messages_name_the_path() {
        let err = HeatmapError::load("analysis/data/Data-1.json", LoadError::Empty);
        assert_eq!(
            err.to_string(),
            "failed to load analysis/data/Data-1.json: dataset contains no episodes"
        );
    }
}
