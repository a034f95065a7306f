use super::{fail, AppState};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Static bearer token check in front of every route.
pub(super) async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = format!("Bearer {}", state.config.bearer_token);
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);

    if !authorized {
        warn!(uri = %request.uri(), "Unauthorized request");
        return fail(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(request).await
}
