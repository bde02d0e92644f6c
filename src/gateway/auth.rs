use super::AppState;
use super::error::ApiError;
use crate::security::validate_api_key;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Rejects the request before any extractor or handler runs unless
/// `X-API-Key` matches. The presented key is never logged.
pub(super) async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if validate_api_key(request.headers(), state.config.api_key()) {
        return next.run(request).await;
    }

    tracing::warn!(
        method = %request.method(),
        path = %request.uri().path(),
        "rejected request with missing or invalid API key"
    );
    ApiError::Unauthorized.into_response()
}
