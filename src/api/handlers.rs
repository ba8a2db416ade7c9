//! Route handlers
//!
//! Heatmap work blocks on file I/O and rasterization, so it runs on the
//! blocking pool.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::AppState;
use super::response::{ApiError, CountResponse, HeatmapResponse, TextResponse};
use crate::files::FileFilter;
use crate::selection::{Percentage, RangeType, RankKey, SelectionPolicy};
use crate::service::HeatmapRequest;

/// POST body naming the directory that holds `Data-<dat_id>.json`
#[derive(Debug, Deserialize)]
pub struct DatasetBody {
    pub file_path: String,
}

type BodyResult = Result<Json<DatasetBody>, JsonRejection>;
type RankedPath = Result<Path<(String, String, String)>, PathRejection>;
type DatIdPath = Result<Path<String>, PathRejection>;

async fn create(
    state: AppState,
    policy: SelectionPolicy,
    dat_id: String,
    body: BodyResult,
) -> Result<Json<HeatmapResponse>, ApiError> {
    let Json(body) = body?;
    let request = HeatmapRequest {
        policy,
        dat_id,
        data_root: PathBuf::from(body.file_path),
    };

    let service = Arc::clone(&state.service);
    let rendered = tokio::task::spawn_blocking(move || service.create_heatmap(&request))
        .await
        .map_err(|e| ApiError::internal(format!("Heatmap task failed: {}", e)))??;

    Ok(Json(HeatmapResponse {
        name: rendered.name,
        base64: STANDARD.encode(&rendered.bytes),
    }))
}

fn ranked_policy(
    key: RankKey,
    range_type: &str,
    percentage: &str,
) -> Result<SelectionPolicy, ApiError> {
    let range: RangeType = range_type.parse()?;
    let pct: Percentage = percentage.parse()?;
    Ok(SelectionPolicy::ranked(key, range, pct))
}

pub async fn by_reward(
    State(state): State<AppState>,
    path: RankedPath,
    body: BodyResult,
) -> Result<Json<HeatmapResponse>, ApiError> {
    let Path((range_type, percentage, dat_id)) = path?;
    let policy = ranked_policy(RankKey::Reward, &range_type, &percentage)?;
    create(state, policy, dat_id, body).await
}

pub async fn by_episode_length(
    State(state): State<AppState>,
    path: RankedPath,
    body: BodyResult,
) -> Result<Json<HeatmapResponse>, ApiError> {
    let Path((range_type, percentage, dat_id)) = path?;
    let policy = ranked_policy(RankKey::EpisodeLength, &range_type, &percentage)?;
    create(state, policy, dat_id, body).await
}

pub async fn naive(
    State(state): State<AppState>,
    path: DatIdPath,
    body: BodyResult,
) -> Result<Json<HeatmapResponse>, ApiError> {
    let Path(dat_id) = path?;
    create(state, SelectionPolicy::All, dat_id, body).await
}

pub async fn by_last_position(
    State(state): State<AppState>,
    path: DatIdPath,
    body: BodyResult,
) -> Result<Json<HeatmapResponse>, ApiError> {
    let Path(dat_id) = path?;
    create(state, SelectionPolicy::ByLastPosition, dat_id, body).await
}

pub async fn count_dat_files(State(state): State<AppState>) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.service.count_dat_files(),
    })
}

pub async fn home() -> Json<TextResponse> {
    Json(TextResponse {
        text: "This is home url".to_string(),
    })
}

pub async fn all_files(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.service.list_files(FileFilter::All))
}

pub async fn dat_files(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.service.list_files(FileFilter::Dat))
}

pub async fn json_files(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.service.list_files(FileFilter::Json))
}
