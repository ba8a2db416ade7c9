//! Data directory listing helpers

use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::DATASET_FILE_PREFIX;

/// Which files a listing should include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFilter {
    All,
    Dat,
    Json,
}

impl FileFilter {
    fn matches(self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match self {
            Self::All => true,
            Self::Dat => ext.as_deref() == Some("dat"),
            Self::Json => ext.as_deref() == Some("json"),
        }
    }
}

/// Sorted file names (not paths) directly inside `dir`.
/// A missing or unreadable directory lists as empty.
pub fn list_files(dir: &Path, filter: FileFilter) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| filter.matches(&entry.path()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();
    names
}

/// Full paths of the files `list_files` would return
pub fn list_paths(dir: &Path, filter: FileFilter) -> Vec<PathBuf> {
    list_files(dir, filter)
        .into_iter()
        .map(|name| dir.join(name))
        .collect()
}

/// `<root>/Data-<dat_id>.json`
pub fn dataset_json_path(root: &Path, dat_id: &str) -> PathBuf {
    root.join(format!("{}{}.json", DATASET_FILE_PREFIX, dat_id))
}

/// Sibling path with the other extension (`Data-1.dat` <-> `Data-1.json`)
pub fn sibling_with_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

/// Unique hidden temp path beside `path`, for write-then-rename
pub fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
}
