//! Episode selection policies
//!
//! A policy picks which episodes of a dataset feed a heatmap. The output is
//! always a sub-sequence of the input in its original order.

use std::fmt;
use std::str::FromStr;

use crate::episodes::EpisodeRecord;
use crate::error::HeatmapError;

/// Percentage in (0, 100]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Percentage {
    pub fn new(value: f64) -> Result<Self, HeatmapError> {
        if !value.is_finite() || value <= 0.0 || value > 100.0 {
            return Err(HeatmapError::InvalidParameter(format!(
                "percentage must be in (0, 100], got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// `ceil(len * pct / 100)`, never more than `len`
    pub fn count_of(self, len: usize) -> usize {
        let count = (len as f64 * self.0 / 100.0).ceil() as usize;
        count.min(len)
    }
}

impl FromStr for Percentage {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| {
            HeatmapError::InvalidParameter(format!("percentage is not a number: {:?}", s))
        })?;
        Self::new(value)
    }
}

impl fmt::Display for Percentage {
    // Shortest decimal form: 40.0 prints as "40", 12.5 as "12.5"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeType {
    Top,
    Bottom,
}

impl RangeType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl FromStr for RangeType {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            other => Err(HeatmapError::InvalidParameter(format!(
                "range type must be \"top\" or \"bottom\", got {:?}",
                other
            ))),
        }
    }
}

/// Which per-episode value a ranked policy sorts by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKey {
    Reward,
    EpisodeLength,
}

impl RankKey {
    fn value(self, record: &EpisodeRecord) -> f32 {
        match self {
            Self::Reward => record.reward,
            Self::EpisodeLength => record.duration,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Reward => "reward",
            Self::EpisodeLength => "episode_length",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionPolicy {
    /// Every episode
    All,
    /// The top or bottom `pct` percent of episodes by `key`
    Ranked {
        key: RankKey,
        range: RangeType,
        pct: Percentage,
    },
    /// Every episode that has a final position; rendered one sample per episode
    ByLastPosition,
}

impl SelectionPolicy {
    pub fn top_by_reward(pct: Percentage) -> Self {
        Self::ranked(RankKey::Reward, RangeType::Top, pct)
    }

    pub fn bottom_by_reward(pct: Percentage) -> Self {
        Self::ranked(RankKey::Reward, RangeType::Bottom, pct)
    }

    pub fn top_by_episode_length(pct: Percentage) -> Self {
        Self::ranked(RankKey::EpisodeLength, RangeType::Top, pct)
    }

    pub fn bottom_by_episode_length(pct: Percentage) -> Self {
        Self::ranked(RankKey::EpisodeLength, RangeType::Bottom, pct)
    }

    pub fn ranked(key: RankKey, range: RangeType, pct: Percentage) -> Self {
        Self::Ranked { key, range, pct }
    }

    /// Kind segment of the output file name
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::All => "naive",
            Self::Ranked { key, .. } => key.label(),
            Self::ByLastPosition => "last_position",
        }
    }
}

/// Apply `policy` to `records`, preserving original relative order
pub fn select<'a, I>(records: I, policy: &SelectionPolicy) -> Vec<&'a EpisodeRecord>
where
    I: IntoIterator<Item = &'a EpisodeRecord>,
{
    let records: Vec<&'a EpisodeRecord> = records.into_iter().collect();
    match *policy {
        SelectionPolicy::All => records,
        SelectionPolicy::ByLastPosition => records
            .into_iter()
            .filter(|record| record.final_position().is_some())
            .collect(),
        SelectionPolicy::Ranked { key, range, pct } => select_ranked(records, key, range, pct),
    }
}

fn select_ranked<'a>(
    records: Vec<&'a EpisodeRecord>,
    key: RankKey,
    range: RangeType,
    pct: Percentage,
) -> Vec<&'a EpisodeRecord> {
    let count = pct.count_of(records.len());

    // Stable sort of indices: equal keys keep original order, so the earlier
    // record wins at the cut
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| {
        let ordering = key.value(records[a]).total_cmp(&key.value(records[b]));
        match range {
            RangeType::Top => ordering.reverse(),
            RangeType::Bottom => ordering,
        }
    });

    let mut chosen = vec![false; records.len()];
    for &idx in order.iter().take(count) {
        chosen[idx] = true;
    }

    records
        .into_iter()
        .zip(chosen)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect()
}
