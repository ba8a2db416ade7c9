//! Recorder binary DAT layout
//!
//! Little-endian stream of episodes with no header. Each episode is
//! `i32 episode_number, f32 duration, f32 reward, i32 count` followed by
//! `count` pairs of `f32 x, f32 y`.

use std::fs;
use std::path::Path;

use super::record::{EpisodeRecord, Position};
use crate::error::LoadError;

const EPISODE_HEADER_BYTES: usize = 16;
const POSITION_BYTES: usize = 8;

struct DatReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> DatReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take4(&mut self) -> [u8; 4] {
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[self.offset..self.offset + 4]);
        self.offset += 4;
        word
    }

    fn read_i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take4())
    }

    fn read_f32(&mut self) -> f32 {
        f32::from_le_bytes(self.take4())
    }

    fn read_episode(&mut self) -> Result<EpisodeRecord, LoadError> {
        let start = self.offset;
        if self.remaining() < EPISODE_HEADER_BYTES {
            return Err(LoadError::Malformed(format!(
                "truncated episode header at byte {}",
                start
            )));
        }

        let episode_number = self.read_i32();
        let duration = self.read_f32();
        let reward = self.read_f32();
        let count = self.read_i32();
        let count = usize::try_from(count).map_err(|_| {
            LoadError::Malformed(format!(
                "episode {} has negative sample count {}",
                episode_number, count
            ))
        })?;

        if self.remaining() / POSITION_BYTES < count {
            return Err(LoadError::Malformed(format!(
                "episode {} declares {} samples but only {} bytes remain",
                episode_number,
                count,
                self.remaining()
            )));
        }

        let mut positions = Vec::with_capacity(count);
        for _ in 0..count {
            let x = self.read_f32();
            let y = self.read_f32();
            positions.push(Position::new(x, y));
        }

        Ok(EpisodeRecord {
            episode_number,
            duration,
            reward,
            positions,
        })
    }
}

/// Decode a DAT byte stream into episode records
pub fn parse_dat(bytes: &[u8]) -> Result<Vec<EpisodeRecord>, LoadError> {
    let mut reader = DatReader::new(bytes);
    let mut records = Vec::new();
    while reader.remaining() > 0 {
        records.push(reader.read_episode()?);
    }
    Ok(records)
}

pub fn read_dat(path: &Path) -> Result<Vec<EpisodeRecord>, LoadError> {
    let bytes = fs::read(path).map_err(LoadError::from_io)?;
    parse_dat(&bytes)
}

/// Encode records in the DAT layout (used by the dataset generator)
pub fn encode_dat(records: &[EpisodeRecord]) -> Vec<u8> {
    let capacity = records
        .iter()
        .map(|r| EPISODE_HEADER_BYTES + r.positions.len() * POSITION_BYTES)
        .sum();
    let mut bytes = Vec::with_capacity(capacity);
    for record in records {
        bytes.extend_from_slice(&record.episode_number.to_le_bytes());
        bytes.extend_from_slice(&record.duration.to_le_bytes());
        bytes.extend_from_slice(&record.reward.to_le_bytes());
        let count = i32::try_from(record.positions.len()).unwrap_or(i32::MAX);
        bytes.extend_from_slice(&count.to_le_bytes());
        for position in record.positions.iter().take(count as usize) {
            bytes.extend_from_slice(&position.x.to_le_bytes());
            bytes.extend_from_slice(&position.y.to_le_bytes());
        }
    }
    bytes
}

pub fn write_dat(path: &Path, records: &[EpisodeRecord]) -> std::io::Result<()> {
    fs::write(path, encode_dat(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_episode(bytes: &mut Vec<u8>, number: i32, duration: f32, reward: f32, xy: &[(f32, f32)]) {
        bytes.extend_from_slice(&number.to_le_bytes());
        bytes.extend_from_slice(&duration.to_le_bytes());
        bytes.extend_from_slice(&reward.to_le_bytes());
        bytes.extend_from_slice(&(xy.len() as i32).to_le_bytes());
        for &(x, y) in xy {
            bytes.extend_from_slice(&x.to_le_bytes());
            bytes.extend_from_slice(&y.to_le_bytes());
        }
    }

    #[test]
    fn test_parse_writer_layout() {
        let mut bytes = Vec::new();
        push_episode(&mut bytes, 1, 10.0, 2.5, &[(0.0, 0.0), (1.5, -2.0)]);
        push_episode(&mut bytes, 2, 3.0, -1.0, &[]);

        let records = parse_dat(&bytes).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].episode_number, 1);
        assert_eq!(records[0].duration, 10.0);
        assert_eq!(records[0].reward, 2.5);
        assert_eq!(records[0].positions, vec![Position::new(0.0, 0.0), Position::new(1.5, -2.0)]);
        assert_eq!(records[1].episode_number, 2);
        assert!(records[1].positions.is_empty());
    }

    #[test]
    fn test_empty_stream_has_no_episodes() {
        assert!(parse_dat(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_samples_are_malformed() {
        let mut bytes = Vec::new();
        push_episode(&mut bytes, 1, 10.0, 2.5, &[(0.0, 0.0), (1.5, -2.0)]);
        bytes.truncate(bytes.len() - 3);
        assert!(matches!(parse_dat(&bytes), Err(LoadError::Malformed(_))));
    }

    #[test]
    fn test_truncated_header_is_malformed() {
        let mut bytes = Vec::new();
        push_episode(&mut bytes, 1, 10.0, 2.5, &[]);
        bytes.extend_from_slice(&7i32.to_le_bytes());
        assert!(matches!(parse_dat(&bytes), Err(LoadError::Malformed(_))));
    }

    #[test]
    fn test_negative_count_is_malformed() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&(-4i32).to_le_bytes());
        assert!(matches!(parse_dat(&bytes), Err(LoadError::Malformed(_))));
    }

    #[test]
    fn test_encoder_matches_writer_layout() {
        let mut expected = Vec::new();
        push_episode(&mut expected, 4, 2.0, 1.0, &[(3.0, 4.0)]);
        let records = parse_dat(&expected).unwrap();
        assert_eq!(encode_dat(&records), expected);
    }
}
