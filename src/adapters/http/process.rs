use super::files::has_mp4_extension;
use crate::domain::job::is_valid_language;
use super::{fail, ok, ApiReply, AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProcessRequest {
    file_path: Option<PathBuf>,
    language: Option<String>,
}

fn is_inside(path: &Path, dir: &Path) -> bool {
    !path
        .components()
        .any(|component| matches!(component, Component::ParentDir))
        && path.starts_with(dir)
}

pub(super) async fn process(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> ApiReply {
    let Some(path) = request.file_path.filter(|path| !path.as_os_str().is_empty()) else {
        warn!("filePath not provided!");
        return fail(StatusCode::BAD_REQUEST, "File path not provided!");
    };

    if !state.config.allow_outside_upload_dir && !is_inside(&path, &state.config.upload_dir) {
        warn!("File path not allowed: {:?}", path);
        return fail(StatusCode::FORBIDDEN, "File path not allowed!");
    }

    if !path.is_file() {
        warn!("File not found: {:?}", path);
        return fail(StatusCode::NOT_FOUND, "File not found!");
    }

    if !has_mp4_extension(&path) {
        warn!("Invalid file type: {:?}", path);
        return fail(StatusCode::BAD_REQUEST, "Invalid file type!");
    }

    let language = request
        .language
        .filter(|language| !language.trim().is_empty())
        .unwrap_or_else(|| state.default_language.clone());
    if !is_valid_language(&language) {
        warn!("Invalid language: {:?}", language);
        return fail(StatusCode::BAD_REQUEST, "Invalid language!");
    }

    // Held until the blocking run ends, even if the client goes away.
    let permit = match state.jobs.clone().acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => {
            error!("Processing slots closed: {}", e);
            return fail(StatusCode::SERVICE_UNAVAILABLE, "Processing unavailable");
        }
    };

    let analysis = state.analysis.clone();
    let video = path.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        analysis.analyze(&video, &language)
    })
    .await;

    let artifact = match outcome {
        Ok(Ok(artifact)) => artifact,
        Ok(Err(e)) => {
            error!("Processing failed for {:?}: {}", path, e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Processing failed");
        }
        Err(e) => {
            error!("Processing task for {:?} aborted: {}", path, e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Processing failed");
        }
    };

    match serde_json::to_value(&artifact) {
        Ok(payload) => {
            info!("Processed file {:?}", path);
            ok("Processing completed", Some(payload))
        }
        Err(e) => {
            error!("Cannot encode artifact for {:?}: {}", path, e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Processing failed")
        }
    }
}
