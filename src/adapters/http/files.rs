use super::{fail, ok, ApiReply, AppState};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    BoxError,
};
use futures::{Stream, TryStreamExt};
use serde::Deserialize;
use serde_json::json;
use std::io;
use std::path::{Component, Path};
use tokio::{fs::File, io::BufWriter, io::AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::{error, info, warn};

pub(super) fn has_mp4_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"))
}

/// A bare file name: one normal component, no separators, no `..`.
pub(super) fn path_is_valid(path: &Path) -> bool {
    let mut components = path.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

// Save a `Stream` to a file
pub(super) async fn stream_to_file<S, E>(path: &Path, stream: S) -> io::Result<()>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);

    let mut file = BufWriter::new(File::create(path).await?);
    tokio::io::copy(&mut body_reader, &mut file).await?;
    file.flush().await?;

    Ok(())
}

/// Body-limit and malformed-multipart errors keep their own status.
fn upload_error_status(err: &io::Error) -> StatusCode {
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<MultipartError>())
        .map(MultipartError::status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub(super) async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> ApiReply {
    if state.config.process_files_only {
        warn!("File upload disabled in this environment!");
        return fail(StatusCode::FORBIDDEN, "File upload disabled in this environment!");
    }

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return fail(e.status(), e.body_text()),
        };

        let file_name = match field.file_name() {
            Some(file_name) if field.name() == Some("file") => file_name.to_owned(),
            _ => continue,
        };

        let name = Path::new(&file_name);
        if !path_is_valid(name) {
            return fail(StatusCode::BAD_REQUEST, "Invalid path");
        }
        if !has_mp4_extension(name) {
            return fail(StatusCode::BAD_REQUEST, "Only .mp4 files are allowed");
        }

        let upload_dir = &state.config.upload_dir;
        let path = upload_dir.join(name);
        if path.exists() {
            warn!("File already exists: {:?}", path);
            return ok("File uploaded!", Some(json!({ "filePath": path })));
        }

        if let Err(e) = tokio::fs::create_dir_all(upload_dir).await {
            error!("Cannot create upload dir {:?}: {}", upload_dir, e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }

        info!("Saving new file to {:?}", path);
        if let Err(e) = stream_to_file(&path, field).await {
            error!("Upload of {:?} failed: {}", path, e);
            let _ = tokio::fs::remove_file(&path).await;
            return fail(upload_error_status(&e), e.to_string());
        }

        return ok("File uploaded!", Some(json!({ "filePath": path })));
    }

    fail(StatusCode::BAD_REQUEST, "File not uploaded!")
}

pub(super) async fn list(State(state): State<AppState>) -> ApiReply {
    if state.config.process_files_only {
        warn!("File listing disabled in this environment!");
        return fail(StatusCode::FORBIDDEN, "File listing disabled in this environment!");
    }

    let mut entries = match tokio::fs::read_dir(&state.config.upload_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            error!("Cannot read upload dir: {}", e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Error reading directory");
        }
    };

    let mut files = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        if let Some(name) = entry.file_name().to_str() {
            files.push(name.to_string());
        }
    }
    files.sort();

    ok("Files listed!", Some(json!({ "files": files })))
}

#[derive(Debug, Deserialize)]
pub(super) struct DeleteQuery {
    #[serde(rename = "fileName")]
    file_name: Option<String>,
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> ApiReply {
    if state.config.process_files_only {
        warn!("File deletion disabled in this environment!");
        return fail(StatusCode::FORBIDDEN, "File deletion disabled in this environment!");
    }

    let Some(file_name) = query.file_name.filter(|name| !name.is_empty()) else {
        return fail(StatusCode::BAD_REQUEST, "File name not provided!");
    };
    if !path_is_valid(Path::new(&file_name)) {
        return fail(StatusCode::BAD_REQUEST, "Invalid path");
    }

    let path = state.config.upload_dir.join(&file_name);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            info!("File deleted: {:?}", path);
            ok("File deleted successfully!", None)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("File not found: {:?}", path);
            ok("File deleted!", None)
        }
        Err(e) => {
            error!("Cannot delete {:?}: {}", path, e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
