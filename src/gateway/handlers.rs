use super::AppState;
use super::error::{ApiError, Target};
use super::operation::{ApiRequest, ItemParams, Operation, WriteParams};
use super::ops;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct CommandQuery {
    command: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommandBody {
    command: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PathQuery {
    path: Option<String>,
}

fn json_error(target: Target, rejection: &JsonRejection, expected: &str) -> ApiError {
    ApiError::bad_request(
        target,
        format!("Invalid JSON: {}. Expected: {expected}", rejection.body_text()),
    )
}

/// GET /health, unauthenticated
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "security_level": state.policy.tier,
    }))
}

/// GET /cli?command=...
pub(super) async fn handle_cli_query(
    State(state): State<AppState>,
    Query(query): Query<CommandQuery>,
) -> Result<Response, ApiError> {
    let Some(command) = query.command else {
        return Err(ApiError::bad_request(
            Target::None,
            "missing query parameter: command",
        ));
    };
    Ok(Json(ops::execute_command(&state, &command).await?).into_response())
}

/// POST /cli with `{command}` or `?command=`
pub(super) async fn handle_cli_body(
    State(state): State<AppState>,
    Query(query): Query<CommandQuery>,
    body: Result<Json<CommandBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let command = match (query.command, body) {
        (Some(command), _) => command,
        (None, Ok(Json(body))) => body.command,
        (None, Err(rejection)) => {
            return Err(json_error(Target::None, &rejection, r#"{"command": "..."}"#));
        }
    };
    Ok(Json(ops::execute_command(&state, &command).await?).into_response())
}

/// GET /read-file?path=...
pub(super) async fn handle_read_file(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Response, ApiError> {
    let Some(path) = query.path else {
        return Err(ApiError::bad_request(
            Target::None,
            "missing query parameter: path",
        ));
    };
    Ok(Json(ops::read_file(&state, &path).await?).into_response())
}

/// POST /write-file
pub(super) async fn handle_write_file(
    State(state): State<AppState>,
    body: Result<Json<WriteParams>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(params) = body.map_err(|rejection| {
        json_error(
            Target::None,
            &rejection,
            r#"{"path": "...", "content": "..."}"#,
        )
    })?;
    Ok(Json(ops::write_file(&state, &params.path, &params.content).await?).into_response())
}

/// POST /items
pub(super) async fn handle_create_item(
    State(state): State<AppState>,
    body: Result<Json<ItemParams>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(params) = body.map_err(|rejection| {
        json_error(
            Target::None,
            &rejection,
            r#"{"name": "...", "description": "..."}"#,
        )
    })?;
    Ok(Json(ops::create_item(&state, &params.name, &params.description).await?).into_response())
}

/// GET /items
pub(super) async fn handle_list_items(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(Json(ops::list_items(&state).await?).into_response())
}

/// GET /items/{item_id}
pub(super) async fn handle_get_item(
    State(state): State<AppState>,
    item_id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(item_id) = item_id.map_err(|rejection| {
        ApiError::bad_request(
            Target::None,
            format!("item_id must be an integer: {}", rejection.body_text()),
        )
    })?;
    Ok(Json(ops::get_item(&state, item_id).await?).into_response())
}

/// POST /api
pub(super) async fn handle_api(
    State(state): State<AppState>,
    body: Result<Json<ApiRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        json_error(
            Target::None,
            &rejection,
            r#"{"operation": "...", "params": {...}}"#,
        )
    })?;
    let operation = Operation::try_from(request)?;
    dispatch(&state, operation).await
}

pub(super) async fn dispatch(state: &AppState, operation: Operation) -> Result<Response, ApiError> {
    let response = match operation {
        Operation::ExecuteCommand(p) => Json(ops::execute_command(state, &p.command).await?).into_response(),
        Operation::ReadFile(p) => Json(ops::read_file(state, &p.path).await?).into_response(),
        Operation::WriteFile(p) => {
            Json(ops::write_file(state, &p.path, &p.content).await?).into_response()
        }
        Operation::CreateItem(p) => {
            Json(ops::create_item(state, &p.name, &p.description).await?).into_response()
        }
        Operation::ListItems => Json(ops::list_items(state).await?).into_response(),
        Operation::GetItem(p) => Json(ops::get_item(state, p.item_id).await?).into_response(),
    };
    Ok(response)
}
