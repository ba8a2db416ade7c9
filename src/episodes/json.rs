//! Recorder JSON layout
//!
//! ```json
//! {"episodes": [{"episode_number": 1, "duration": 12.5, "reward": 3.0,
//!                "pos_x": [0.0, 1.0], "pos_y": [0.0, 0.5]}]}
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::record::{EpisodeRecord, Position};
use crate::error::LoadError;
use crate::files::temp_sibling;

#[derive(Debug, Serialize, Deserialize)]
struct EpisodeFile {
    episodes: Vec<EpisodeEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EpisodeEntry {
    episode_number: i32,
    duration: f32,
    reward: f32,
    #[serde(default)]
    pos_x: Vec<f32>,
    #[serde(default)]
    pos_y: Vec<f32>,
}

impl EpisodeEntry {
    fn into_record(self) -> Result<EpisodeRecord, LoadError> {
        if self.pos_x.len() != self.pos_y.len() {
            return Err(LoadError::Malformed(format!(
                "episode {} has {} x samples but {} y samples",
                self.episode_number,
                self.pos_x.len(),
                self.pos_y.len()
            )));
        }
        let positions = self
            .pos_x
            .into_iter()
            .zip(self.pos_y)
            .map(|(x, y)| Position::new(x, y))
            .collect();
        Ok(EpisodeRecord {
            episode_number: self.episode_number,
            duration: self.duration,
            reward: self.reward,
            positions,
        })
    }

    fn from_record(record: &EpisodeRecord) -> Self {
        Self {
            episode_number: record.episode_number,
            duration: record.duration,
            reward: record.reward,
            pos_x: record.positions.iter().map(|p| p.x).collect(),
            pos_y: record.positions.iter().map(|p| p.y).collect(),
        }
    }
}

/// Parse recorder JSON text into episode records
pub fn parse_json(content: &str) -> Result<Vec<EpisodeRecord>, LoadError> {
    let file: EpisodeFile =
        serde_json::from_str(content).map_err(|e| LoadError::Malformed(e.to_string()))?;
    file.episodes
        .into_iter()
        .map(EpisodeEntry::into_record)
        .collect()
}

/// Read and parse a recorder JSON file
pub fn read_json(path: &Path) -> Result<Vec<EpisodeRecord>, LoadError> {
    let content = fs::read_to_string(path).map_err(LoadError::from_io)?;
    parse_json(&content)
}

/// Write records in the recorder JSON layout.
///
/// JSON has no NaN or infinity, so records holding one are rejected rather
/// than written as `null`. The file is replaced atomically, so a reader never
/// sees a partial write.
pub fn write_json(path: &Path, records: &[EpisodeRecord]) -> Result<(), LoadError> {
    if let Some(record) = records.iter().find(|r| !is_finite(r)) {
        return Err(LoadError::Malformed(format!(
            "episode {} has non-finite values that JSON cannot represent",
            record.episode_number
        )));
    }

    let file = EpisodeFile {
        episodes: records.iter().map(EpisodeEntry::from_record).collect(),
    };
    let tmp_path = temp_sibling(path);
    let result = write_file(&tmp_path, &file).and_then(|_| fs::rename(&tmp_path, path));
    if let Err(err) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(LoadError::Io(err));
    }
    Ok(())
}

fn is_finite(record: &EpisodeRecord) -> bool {
    record.duration.is_finite()
        && record.reward.is_finite()
        && record
            .positions
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite())
}

fn write_file(path: &Path, file: &EpisodeFile) -> std::io::Result<()> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer(&mut writer, file)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    writer.flush()
}
