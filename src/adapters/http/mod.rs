//! Authenticated HTTP boundary.
//!
//! Every route requires `Authorization: Bearer <token>` and answers with an
//! [`ApiResponse`] envelope.

mod auth;
mod files;
mod process;
pub mod retention;

use crate::config::ServerConfig;
use crate::ports::analysis::AnalysisPort;
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub analysis: Arc<dyn AnalysisPort>,
    /// Language used when a process request does not name one
    pub default_language: String,
    /// Pipeline run slots shared by all process requests
    pub jobs: Arc<Semaphore>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        analysis: Arc<dyn AnalysisPort>,
        default_language: String,
    ) -> Self {
        let jobs = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        Self {
            config: Arc::new(config),
            analysis,
            default_language,
            jobs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

pub type ApiReply = (StatusCode, Json<ApiResponse>);

fn ok(msg: &str, payload: Option<Value>) -> ApiReply {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            msg: msg.to_string(),
            payload,
        }),
    )
}

fn fail(status: StatusCode, msg: impl Into<String>) -> ApiReply {
    (
        status,
        Json(ApiResponse {
            success: false,
            msg: msg.into(),
            payload: None,
        }),
    )
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_size;

    Router::new()
        .route("/upload", post(files::upload))
        .route("/files", get(files::list))
        .route("/delete", delete(files::delete))
        .route("/process", post(process::process))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisArtifact, FrameRecord};
    use crate::error::PipelineError;
    use crate::ports::analysis::MockAnalysisPort;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use std::path::{Path, PathBuf};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    const TOKEN: &str = "s3cret";

    fn config(upload_dir: &Path) -> ServerConfig {
        ServerConfig {
            addr: "127.0.0.1".to_string(),
            port: 3330,
            upload_dir: upload_dir.to_path_buf(),
            max_upload_size: 1024,
            retention_days: 2,
            bearer_token: TOKEN.to_string(),
            process_files_only: false,
            allow_outside_upload_dir: false,
            max_concurrent_jobs: 1,
        }
    }

    fn state(config: ServerConfig, analysis: MockAnalysisPort) -> AppState {
        AppState::new(config, Arc::new(analysis), "en".to_string())
    }

    fn app(config: ServerConfig, analysis: MockAnalysisPort) -> Router {
        router(state(config, analysis))
    }

    fn idle_analysis() -> MockAnalysisPort {
        let mut analysis = MockAnalysisPort::new();
        analysis.expect_analyze().never();
        analysis
    }

    fn request(method: Method, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
    }

    fn process_request(body: Value) -> Request<Body> {
        request(Method::POST, "/process")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload_request(file_name: &str, data: &str) -> Request<Body> {
        let body = format!(
            "--XBOUNDARY\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
             Content-Type: video/mp4\r\n\r\n\
             {}\r\n\
             --XBOUNDARY--\r\n",
            file_name, data
        );
        request(Method::POST, "/upload")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, ApiResponse) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn uploads() -> (TempDir, PathBuf) {
        let temp_dir = tempdir().unwrap();
        let upload_dir = temp_dir.path().join("uploads");
        std::fs::create_dir_all(&upload_dir).unwrap();
        (temp_dir, upload_dir)
    }

    #[tokio::test]
    async fn test_missing_or_wrong_token_is_unauthorized() {
        let (_temp_dir, upload_dir) = uploads();

        let request = Request::builder().uri("/files").body(Body::empty()).unwrap();
        let (status, body) = send(app(config(&upload_dir), idle_analysis()), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(!body.success);

        let request = Request::builder()
            .uri("/files")
            .header(header::AUTHORIZATION, "Bearer nope")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app(config(&upload_dir), idle_analysis()), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_then_list() {
        let (_temp_dir, upload_dir) = uploads();

        let (status, body) = send(
            app(config(&upload_dir), idle_analysis()),
            upload_request("clip.mp4", "fake video bytes"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(
            std::fs::read_to_string(upload_dir.join("clip.mp4")).unwrap(),
            "fake video bytes"
        );

        let (status, body) = send(
            app(config(&upload_dir), idle_analysis()),
            request(Method::GET, "/files").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.payload, Some(serde_json::json!({ "files": ["clip.mp4"] })));
    }

    #[tokio::test]
    async fn test_upload_keeps_existing_file() {
        let (_temp_dir, upload_dir) = uploads();
        std::fs::write(upload_dir.join("clip.mp4"), "original").unwrap();

        let (status, body) = send(
            app(config(&upload_dir), idle_analysis()),
            upload_request("clip.mp4", "replacement"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(
            std::fs::read_to_string(upload_dir.join("clip.mp4")).unwrap(),
            "original"
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_other_extensions() {
        let (_temp_dir, upload_dir) = uploads();

        let (status, body) = send(
            app(config(&upload_dir), idle_analysis()),
            upload_request("notes.txt", "hello"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert!(!upload_dir.join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_process_only_mode_disables_file_routes() {
        let (_temp_dir, upload_dir) = uploads();
        let mut config = config(&upload_dir);
        config.process_files_only = true;

        let (status, _) = send(
            app(config.clone(), idle_analysis()),
            request(Method::GET, "/files").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            app(config.clone(), idle_analysis()),
            upload_request("clip.mp4", "data"),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            app(config, idle_analysis()),
            request(Method::DELETE, "/delete?fileName=clip.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_delete() {
        let (_temp_dir, upload_dir) = uploads();
        std::fs::write(upload_dir.join("clip.mp4"), "data").unwrap();

        let (status, body) = send(
            app(config(&upload_dir), idle_analysis()),
            request(Method::DELETE, "/delete?fileName=clip.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.msg, "File deleted successfully!");
        assert!(!upload_dir.join("clip.mp4").exists());

        let (status, body) = send(
            app(config(&upload_dir), idle_analysis()),
            request(Method::DELETE, "/delete?fileName=clip.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);

        let (status, _) = send(
            app(config(&upload_dir), idle_analysis()),
            request(Method::DELETE, "/delete?fileName=../secret.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            app(config(&upload_dir), idle_analysis()),
            request(Method::DELETE, "/delete").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_process_returns_artifact() {
        let (_temp_dir, upload_dir) = uploads();
        let video = upload_dir.join("call.mp4");
        std::fs::write(&video, "data").unwrap();

        let mut analysis = MockAnalysisPort::new();
        let expected_path = video.clone();
        analysis
            .expect_analyze()
            .withf(move |path, language| path == expected_path && language == "fr")
            .times(1)
            .returning(|_, _| {
                Ok(AnalysisArtifact {
                    frames: vec![FrameRecord {
                        timestamp: 0.0,
                        detections: vec!["person".to_string()],
                        texts: vec![],
                        emotions: vec![],
                        is_scene_changed: false,
                    }],
                    audio_transcription: vec![],
                })
            });

        let (status, body) = send(
            app(config(&upload_dir), analysis),
            process_request(serde_json::json!({ "filePath": video, "language": "fr" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let payload = body.payload.unwrap();
        assert_eq!(payload["frames"][0]["detections"][0], "person");
        assert_eq!(payload["frames"][0]["isSceneChanged"], false);
    }

    #[tokio::test]
    async fn test_process_rejections() {
        let (temp_dir, upload_dir) = uploads();
        let outside = temp_dir.path().join("elsewhere.mp4");
        std::fs::write(&outside, "data").unwrap();
        std::fs::write(upload_dir.join("notes.txt"), "data").unwrap();

        let cases = [
            (serde_json::json!({}), StatusCode::BAD_REQUEST),
            (serde_json::json!({ "filePath": outside }), StatusCode::FORBIDDEN),
            (
                serde_json::json!({ "filePath": upload_dir.join("missing.mp4") }),
                StatusCode::NOT_FOUND,
            ),
            (
                serde_json::json!({ "filePath": upload_dir.join("notes.txt") }),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (body, expected) in cases {
            let (status, response) =
                send(app(config(&upload_dir), idle_analysis()), process_request(body)).await;
            assert_eq!(status, expected);
            assert!(!response.success);
        }
    }

    #[tokio::test]
    async fn test_process_outside_upload_dir_when_allowed() {
        let (temp_dir, upload_dir) = uploads();
        let outside = temp_dir.path().join("elsewhere.mp4");
        std::fs::write(&outside, "data").unwrap();

        let mut analysis = MockAnalysisPort::new();
        analysis
            .expect_analyze()
            .times(1)
            .returning(|_, _| Ok(AnalysisArtifact::default()));
        let mut config = config(&upload_dir);
        config.allow_outside_upload_dir = true;

        let (status, _) = send(
            app(config, analysis),
            process_request(serde_json::json!({ "filePath": outside })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_process_rejects_language_unfit_for_cache_name() {
        let (_temp_dir, upload_dir) = uploads();
        let video = upload_dir.join("call.mp4");
        std::fs::write(&video, "data").unwrap();

        let (status, body) = send(
            app(config(&upload_dir), idle_analysis()),
            process_request(serde_json::json!({ "filePath": video, "language": "pt/BR" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.msg, "Invalid language!");
    }

    #[tokio::test]
    async fn test_process_waits_for_a_free_slot() {
        let (_temp_dir, upload_dir) = uploads();
        let video = upload_dir.join("call.mp4");
        std::fs::write(&video, "data").unwrap();

        let mut analysis = MockAnalysisPort::new();
        analysis
            .expect_analyze()
            .times(1)
            .returning(|_, _| Ok(AnalysisArtifact::default()));
        let state = state(config(&upload_dir), analysis);
        let busy = state.jobs.clone().acquire_owned().await.unwrap();

        let pending = tokio::spawn(send(
            router(state.clone()),
            process_request(serde_json::json!({ "filePath": video })),
        ));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!pending.is_finished());

        drop(busy);
        let (status, body) = pending.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(state.jobs.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_process_failure_is_server_error() {
        let (_temp_dir, upload_dir) = uploads();
        let video = upload_dir.join("call.mp4");
        std::fs::write(&video, "data").unwrap();

        let mut analysis = MockAnalysisPort::new();
        analysis
            .expect_analyze()
            .times(1)
            .returning(|path, _| Err(PipelineError::decode(path, "moov atom not found")));

        let (status, body) = send(
            app(config(&upload_dir), analysis),
            process_request(serde_json::json!({ "filePath": video })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.msg, "Processing failed");
    }
}
