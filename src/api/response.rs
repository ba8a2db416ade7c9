//! Response bodies and error -> status mapping

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::{HeatmapError, LoadError};

/// `{text}` body used for messages and every failure
#[derive(Debug, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HeatmapResponse {
    /// File name in the results directory
    pub name: String,
    /// Base64 of the JPEG bytes
    pub base64: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

/// Failure carried to the client as `{text}` with a matching status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub text: String,
}

impl ApiError {
    pub fn internal(text: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            text: text.into(),
        }
    }
}

fn status_for(err: &HeatmapError) -> StatusCode {
    match err {
        HeatmapError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
        HeatmapError::LoadFailure { source, .. } => match source {
            LoadError::Missing => StatusCode::NOT_FOUND,
            LoadError::Malformed(_) | LoadError::Empty => StatusCode::UNPROCESSABLE_ENTITY,
            LoadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        HeatmapError::RenderFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<HeatmapError> for ApiError {
    fn from(err: HeatmapError) -> Self {
        Self {
            status: status_for(&err),
            text: format!("Heatmap was not created: {}", err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            text: format!("Invalid request body: {}", rejection.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            text: format!("Invalid request path: {}", rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{} {}", self.status, self.text);
        } else {
            warn!("{} {}", self.status, self.text);
        }
        (self.status, Json(TextResponse { text: self.text })).into_response()
    }
}
