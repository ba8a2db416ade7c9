//! HTTP surface consumed by the dashboard UI

pub mod handlers;
pub mod response;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::HeatmapService;

pub use response::{ApiError, CountResponse, HeatmapResponse, TextResponse};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<HeatmapService>,
}

impl AppState {
    pub fn new(service: HeatmapService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/home", get(handlers::home))
        .route("/allFiles", get(handlers::all_files))
        .route("/datFiles", get(handlers::dat_files))
        .route("/jsonFiles", get(handlers::json_files))
        .route("/count_dat_files", get(handlers::count_dat_files))
        .route(
            "/by_reward/{range_type}/{percentage}/{dat_id}",
            post(handlers::by_reward),
        )
        .route(
            "/by_episode_length/{range_type}/{percentage}/{dat_id}",
            post(handlers::by_episode_length),
        )
        .route("/naive/{dat_id}", post(handlers::naive))
        .route("/by_last_position/{dat_id}", post(handlers::by_last_position))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use http_body_util::BodyExt;
    use serde::de::DeserializeOwned;
    use std::fs;
    use std::path::Path;
    use tower::ServiceExt;

    use crate::episodes::{write_dat, write_json};
    use crate::service::tests::{sample_records, test_service};

    fn app(root: &Path) -> (Router, String) {
        let service = test_service(root);
        let data_root = service.data_directory().to_string_lossy().into_owned();
        write_json(&service.data_directory().join("Data-1.json"), &sample_records()).unwrap();
        (router(AppState::new(service)), data_root)
    }

    fn post_json(uri: &str, data_root: &str) -> Request<Body> {
        let body = serde_json::json!({ "file_path": data_root }).to_string();
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send<T: DeserializeOwned>(app: Router, request: Request<Body>) -> (StatusCode, T) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_by_reward_returns_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let (app, root) = app(dir.path());

        let (status, body): (_, HeatmapResponse) =
            send(app, post_json("/by_reward/top/40/1", &root)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.name, "heatmap_reward_top_40_dat_id_1.jpg");
        let bytes = STANDARD.decode(body.base64).unwrap();
        assert!(image::load_from_memory(&bytes).is_ok());
        assert!(dir.path().join("heatmaps").join(&body.name).exists());
    }

    #[tokio::test]
    async fn test_every_heatmap_route() {
        let dir = tempfile::tempdir().unwrap();
        let (app, root) = app(dir.path());

        let cases = [
            ("/by_episode_length/bottom/12.5/1", "heatmap_episode_length_bottom_12.5_dat_id_1.jpg"),
            ("/naive/1", "heatmap_naive_dat_id_1.jpg"),
            ("/by_last_position/1", "heatmap_last_position_dat_id_1.jpg"),
        ];
        for (uri, name) in cases {
            let (status, body): (_, HeatmapResponse) =
                send(app.clone(), post_json(uri, &root)).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(body.name, name);
        }
    }

    #[tokio::test]
    async fn test_invalid_percentage_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (app, root) = app(dir.path());

        let (status, body): (_, TextResponse) =
            send(app.clone(), post_json("/by_reward/top/150/1", &root)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.text.contains("percentage"));

        let (status, _): (_, TextResponse) =
            send(app, post_json("/by_reward/middle/40/1", &root)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_dataset_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (app, root) = app(dir.path());

        let (status, body): (_, TextResponse) = send(app, post_json("/naive/99", &root)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.text.starts_with("Heatmap was not created"));
    }

    #[tokio::test]
    async fn test_missing_body_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());

        let request = Request::builder()
            .method("POST")
            .uri("/naive/1")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, _): (_, TextResponse) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bad_path_segment_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let (app, root) = app(dir.path());

        let (status, body): (_, TextResponse) =
            send(app.clone(), post_json("/naive/%FF", &root)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.text.starts_with("Invalid request path"));

        let (status, body): (_, TextResponse) =
            send(app, post_json("/by_reward/top/%FF/1", &root)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.text.starts_with("Invalid request path"));
    }

    #[tokio::test]
    async fn test_file_listing_routes() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());
        let data = dir.path().join("data");
        write_dat(&data.join("Data-1.dat"), &sample_records()).unwrap();
        write_dat(&data.join("Data-2.dat"), &sample_records()).unwrap();
        fs::write(data.join("readme.txt"), "notes").unwrap();

        let (_, count): (_, CountResponse) = send(app.clone(), get("/count_dat_files")).await;
        assert_eq!(count.count, 2);

        let (_, dat): (_, Vec<String>) = send(app.clone(), get("/datFiles")).await;
        assert_eq!(dat, vec!["Data-1.dat", "Data-2.dat"]);

        let (_, json): (_, Vec<String>) = send(app.clone(), get("/jsonFiles")).await;
        assert_eq!(json, vec!["Data-1.json"]);

        let (_, all): (_, Vec<String>) = send(app.clone(), get("/allFiles")).await;
        assert_eq!(all.len(), 4);

        let (status, home): (_, TextResponse) = send(app, get("/home")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(home.text, "This is home url");
    }
}
