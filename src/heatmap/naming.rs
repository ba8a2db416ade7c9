//! Output file naming
//!
//! `heatmap_<kind>_[<range>_<pct>_]dat_id_<id>.jpg`

use crate::error::HeatmapError;
use crate::selection::SelectionPolicy;

/// Dataset ids end up in file names, so only `[A-Za-z0-9_-]` is accepted
pub fn validate_dat_id(dat_id: &str) -> Result<(), HeatmapError> {
    let valid = !dat_id.is_empty()
        && dat_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(HeatmapError::InvalidParameter(format!(
            "dat id must be non-empty and contain only letters, digits, '-' or '_', got {:?}",
            dat_id
        )))
    }
}

pub fn heatmap_file_name(policy: &SelectionPolicy, dat_id: &str) -> String {
    match policy {
        SelectionPolicy::Ranked { range, pct, .. } => format!(
            "heatmap_{}_{}_{}_dat_id_{}.jpg",
            policy.kind_label(),
            range.label(),
            pct,
            dat_id
        ),
        SelectionPolicy::All | SelectionPolicy::ByLastPosition => {
            format!("heatmap_{}_dat_id_{}.jpg", policy.kind_label(), dat_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Percentage;

    #[test]
    fn test_file_names() {
        let pct: Percentage = "40".parse().unwrap();
        assert_eq!(
            heatmap_file_name(&SelectionPolicy::top_by_reward(pct), "1"),
            "heatmap_reward_top_40_dat_id_1.jpg"
        );
        let pct: Percentage = "12.5".parse().unwrap();
        assert_eq!(
            heatmap_file_name(&SelectionPolicy::bottom_by_episode_length(pct), "7"),
            "heatmap_episode_length_bottom_12.5_dat_id_7.jpg"
        );
        assert_eq!(
            heatmap_file_name(&SelectionPolicy::All, "3"),
            "heatmap_naive_dat_id_3.jpg"
        );
        assert_eq!(
            heatmap_file_name(&SelectionPolicy::ByLastPosition, "3"),
            "heatmap_last_position_dat_id_3.jpg"
        );
    }

    #[test]
    fn test_dat_id_validation() {
        assert!(validate_dat_id("1").is_ok());
        assert!(validate_dat_id("run_2-b").is_ok());
        for bad in ["", "../1", "1/2", "a b", "1.json"] {
            assert!(validate_dat_id(bad).is_err(), "{:?}", bad);
        }
    }
}
