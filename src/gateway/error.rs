use crate::annotate::{AnnotatedResponse, FAILURE_WARNING};
use crate::error::{FsError, StoreError};
use crate::security::DenyReason;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{Map, Value, json};

/// What a failed request was about, echoed back in the error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Command(String),
    Path(String),
    ItemId(i64),
    ItemName(String),
    Operation(String),
    None,
}

impl Target {
    fn insert_into(&self, body: &mut Map<String, Value>) {
        match self {
            Self::Command(command) => {
                body.insert("command".into(), json!(command));
            }
            Self::Path(path) => {
                body.insert("path".into(), json!(path));
            }
            Self::ItemId(id) => {
                body.insert("item_id".into(), json!(id));
            }
            Self::ItemName(name) => {
                body.insert("name".into(), json!(name));
            }
            Self::Operation(op) => {
                body.insert("operation".into(), json!(op));
            }
            Self::None => {}
        }
    }
}

/// Every failure the gateway reports. Each maps to one status code and one
/// stable `error` code.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    PolicyDenied { target: Target, reason: DenyReason },
    NotFound { target: Target, detail: String },
    /// The command ran past its deadline; carries the partial result.
    Timeout(Box<AnnotatedResponse>),
    BadRequest { target: Target, detail: String },
    Conflict { target: Target, detail: String },
    Internal { target: Target, detail: String },
}

const INTERNAL_DETAIL: &str = "internal error";

impl ApiError {
    pub fn bad_request(target: Target, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            target,
            detail: detail.into(),
        }
    }

    pub fn internal(target: Target) -> Self {
        Self::Internal {
            target,
            detail: INTERNAL_DETAIL.into(),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::PolicyDenied { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "authentication_failed",
            Self::PolicyDenied { .. } => "policy_denied",
            Self::NotFound { .. } => "not_found",
            Self::Timeout(_) => "execution_timeout",
            Self::BadRequest { .. } => "bad_request",
            Self::Conflict { .. } => "conflict",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Map a filesystem failure for the request on `path`.
    pub fn from_fs(err: FsError, path: &str) -> Self {
        let target = Target::Path(path.to_string());
        match err {
            FsError::Denied(reason) => {
                tracing::warn!(path, %reason, "path denied by policy");
                Self::PolicyDenied { target, reason }
            }
            FsError::NotFound(resolved) => Self::NotFound {
                target,
                detail: format!("file not found: {}", resolved.display()),
            },
            FsError::Symlink(_) | FsError::ParentNotDirectory(_) => {
                Self::bad_request(target, err.to_string())
            }
            FsError::TooLarge { .. } | FsError::NotUtf8 => Self::Internal {
                target,
                detail: err.to_string(),
            },
            FsError::Io(e) => {
                tracing::error!(path, error = %e, "file operation failed");
                Self::internal(target)
            }
        }
    }

    /// Map a store failure for the request about `target`.
    pub fn from_store(err: StoreError, target: Target) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound {
                target: Target::ItemId(id),
                detail: format!("item {id} not found"),
            },
            StoreError::Duplicate(_) => Self::Conflict {
                target,
                detail: err.to_string(),
            },
            StoreError::Schema(_) | StoreError::Io(_) | StoreError::Sqlx(_) => {
                tracing::error!(error = %err, "item store failure");
                Self::internal(target)
            }
        }
    }

    fn body(self) -> Value {
        let code = self.code();
        let mut body = Map::new();
        body.insert("error".into(), json!(code));
        match self {
            Self::Unauthorized => {
                body.insert("detail".into(), json!("missing or invalid API key"));
            }
            Self::PolicyDenied { target, reason } => {
                body.insert(
                    "detail".into(),
                    json!(format!("blocked by security policy: {reason}")),
                );
                body.insert("reason".into(), json!(reason.to_string()));
                target.insert_into(&mut body);
            }
            Self::Timeout(partial) => {
                body.insert(
                    "detail".into(),
                    json!("command exceeded its time limit and was killed"),
                );
                if let Some(command) = &partial.command {
                    body.insert("command".into(), json!(command));
                }
                body.insert("result".into(), json!(*partial));
            }
            Self::NotFound { target, detail }
            | Self::BadRequest { target, detail }
            | Self::Conflict { target, detail }
            | Self::Internal { target, detail } => {
                body.insert("detail".into(), json!(detail));
                target.insert_into(&mut body);
            }
        }
        body.insert("warning".into(), json!(FAILURE_WARNING));
        Value::Object(body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
