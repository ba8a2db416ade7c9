//! Episode records and loaded datasets

use std::path::{Path, PathBuf};

use crate::heatmap::GridBounds;

/// A single recorded agent position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One simulated episode: positional trace plus summary values
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRecord {
    pub episode_number: i32,
    /// Episode length as recorded (seconds of simulation)
    pub duration: f32,
    /// Total reward collected during the episode
    pub reward: f32,
    /// Position samples in recording order
    pub positions: Vec<Position>,
}

impl EpisodeRecord {
    pub fn final_position(&self) -> Option<Position> {
        self.positions.last().copied()
    }

    pub fn sample_count(&self) -> usize {
        self.positions.len()
    }
}

/// A parsed dataset file, shared read-only once cached
#[derive(Debug)]
pub struct Dataset {
    source: PathBuf,
    episodes: Vec<EpisodeRecord>,
    bounds: Option<GridBounds>,
}

impl Dataset {
    pub fn new(source: impl Into<PathBuf>, episodes: Vec<EpisodeRecord>) -> Self {
        let bounds = GridBounds::enclosing(
            episodes
                .iter()
                .flat_map(|episode| episode.positions.iter().copied()),
        );
        Self {
            source: source.into(),
            episodes,
            bounds,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn episodes(&self) -> &[EpisodeRecord] {
        &self.episodes
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Extent of every sample in the dataset, `None` when no episode has samples.
    /// Renders of different selections share this frame so they line up.
    pub fn bounds(&self) -> Option<GridBounds> {
        self.bounds
    }

    pub fn total_samples(&self) -> usize {
        self.episodes.iter().map(EpisodeRecord::sample_count).sum()
    }
}
