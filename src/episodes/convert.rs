//! DAT -> JSON conversion
//!
//! Uses Rayon to convert every DAT file in a directory concurrently.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::dat::read_dat;
use super::json::write_json;
use crate::error::LoadError;
use crate::files::{FileFilter, list_paths, sibling_with_extension};

/// Outcome of syncing a data directory
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// JSON files written during this run
    pub converted: Vec<PathBuf>,
    /// DAT files that already had a JSON sibling
    pub skipped: Vec<PathBuf>,
    /// DAT files that could not be converted, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl ConversionReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Convert one DAT file, returning the number of episodes written
pub fn convert_dat_to_json(dat_path: &Path, json_path: &Path) -> Result<usize, LoadError> {
    let records = read_dat(dat_path)?;
    write_json(json_path, &records)?;
    info!(
        "Converted {} -> {} ({} episodes)",
        dat_path.display(),
        json_path.display(),
        records.len()
    );
    Ok(records.len())
}

/// Convert every DAT file in `dir` that has no JSON sibling yet
pub fn sync_directory(dir: &Path) -> ConversionReport {
    let (pending, skipped): (Vec<PathBuf>, Vec<PathBuf>) = list_paths(dir, FileFilter::Dat)
        .into_iter()
        .partition(|dat| !sibling_with_extension(dat, "json").exists());

    let results: Vec<(PathBuf, Result<usize, LoadError>)> = pending
        .par_iter()
        .map(|dat| {
            let json = sibling_with_extension(dat, "json");
            let result = convert_dat_to_json(dat, &json);
            (json, result)
        })
        .collect();

    let mut report = ConversionReport {
        skipped,
        ..Default::default()
    };
    for (json, result) in results {
        match result {
            Ok(_) => report.converted.push(json),
            Err(err) => {
                let dat = sibling_with_extension(&json, "dat");
                warn!("Failed to convert {}: {}", dat.display(), err);
                report.failed.push((dat, err.to_string()));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episodes::dat::write_dat;
    use crate::episodes::json::read_json;
    use crate::episodes::record::{EpisodeRecord, Position};
    use std::fs;

    fn sample_records() -> Vec<EpisodeRecord> {
        vec![EpisodeRecord {
            episode_number: 1,
            duration: 5.0,
            reward: 2.0,
            positions: vec![Position::new(1.0, 2.0), Position::new(3.0, 4.0)],
        }]
    }

    #[test]
    fn test_convert_dat_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let dat = dir.path().join("Data-1.dat");
        let json = dir.path().join("Data-1.json");
        write_dat(&dat, &sample_records()).unwrap();

        assert_eq!(convert_dat_to_json(&dat, &json).unwrap(), 1);
        assert_eq!(read_json(&json).unwrap(), sample_records());
    }

    #[test]
    fn test_nan_in_dat_leaves_no_json() {
        let dir = tempfile::tempdir().unwrap();
        let dat = dir.path().join("Data-1.dat");
        let json = dir.path().join("Data-1.json");
        let mut records = sample_records();
        records[0].reward = f32::NAN;
        write_dat(&dat, &records).unwrap();

        for _ in 0..2 {
            assert!(matches!(
                convert_dat_to_json(&dat, &json),
                Err(LoadError::Malformed(_))
            ));
            assert!(!json.exists());
        }

        // Once the DAT is fixed the same JSON path converts cleanly
        write_dat(&dat, &sample_records()).unwrap();
        assert_eq!(convert_dat_to_json(&dat, &json).unwrap(), 1);
        assert_eq!(read_json(&json).unwrap(), sample_records());
    }

    #[test]
    fn test_sync_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_dat(&dir.path().join("Data-1.dat"), &sample_records()).unwrap();
        write_dat(&dir.path().join("Data-2.dat"), &sample_records()).unwrap();
        fs::write(dir.path().join("Data-2.json"), "{\"episodes\":[]}").unwrap();
        fs::write(dir.path().join("Data-3.dat"), [1u8, 2, 3]).unwrap();

        let report = sync_directory(dir.path());
        assert_eq!(report.converted, vec![dir.path().join("Data-1.json")]);
        assert_eq!(report.skipped, vec![dir.path().join("Data-2.dat")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, dir.path().join("Data-3.dat"));
        assert!(!report.is_clean());
    }
}
