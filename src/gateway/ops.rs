//! The operations behind both the REST routes and `POST /api`.

use super::AppState;
use super::error::{ApiError, Target};
use crate::annotate::{AnnotatedResponse, AnnotationInput, Meta, annotate};
use crate::files::ReadOutcome;
use crate::store::Item;
use serde::Serialize;
use std::path::PathBuf;

/// Body returned by a successful write.
#[derive(Debug, Clone, Serialize)]
pub struct WriteResponse {
    pub status: &'static str,
    pub path: PathBuf,
    pub bytes_written: usize,
    pub created_directories: Vec<PathBuf>,
    pub warning: String,
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

pub(super) async fn execute_command(
    state: &AppState,
    command: &str,
) -> Result<AnnotatedResponse, ApiError> {
    state
        .policy
        .evaluate_command(command)
        .into_result()
        .map_err(|reason| {
            tracing::warn!(command, %reason, "command denied by policy");
            ApiError::PolicyDenied {
                target: Target::Command(command.to_string()),
                reason,
            }
        })?;

    let result = state
        .runner
        .run(command, state.config.exec.timeout())
        .await
        .map_err(|e| {
            tracing::error!(command, error = %e, "command execution failed");
            ApiError::internal(Target::Command(command.to_string()))
        })?;

    let annotated = annotate(
        AnnotationInput::Command(&result),
        &state.policy.workspace_dir,
    );
    if result.timed_out {
        return Err(ApiError::Timeout(Box::new(annotated)));
    }

    tracing::info!(
        command,
        exit_status = result.exit_status,
        duration_ms = result.duration_ms,
        "command executed"
    );
    Ok(annotated)
}

pub(super) async fn read_file(state: &AppState, path: &str) -> Result<AnnotatedResponse, ApiError> {
    let outcome = state
        .files
        .read(path)
        .await
        .map_err(|e| ApiError::from_fs(e, path))?;

    let annotated = match &outcome {
        ReadOutcome::File { path, content } => {
            annotate(AnnotationInput::FileRead { content }, path)
        }
        ReadOutcome::Directory { path, entries } => {
            annotate(AnnotationInput::DirectoryListing(entries), path)
        }
    };
    tracing::debug!(path = %outcome.path().display(), "read served");
    Ok(annotated)
}

pub(super) async fn write_file(
    state: &AppState,
    path: &str,
    content: &str,
) -> Result<WriteResponse, ApiError> {
    let receipt = state
        .files
        .write(path, content)
        .await
        .map_err(|e| ApiError::from_fs(e, path))?;

    tracing::info!(
        path = %receipt.path.display(),
        bytes = receipt.bytes_written,
        "file written"
    );
    Ok(WriteResponse {
        status: "success",
        warning: format!(
            "The file was written ONLY to {}. Refer to it by this exact path.",
            receipt.path.display()
        ),
        path: receipt.path,
        bytes_written: receipt.bytes_written,
        created_directories: receipt.created_directories,
        meta: Meta::default(),
    })
}

pub(super) async fn create_item(
    state: &AppState,
    name: &str,
    description: &str,
) -> Result<Item, ApiError> {
    let item = state
        .store
        .create(name, description)
        .await
        .map_err(|e| ApiError::from_store(e, Target::ItemName(name.to_string())))?;
    tracing::info!(id = item.id, name = %item.name, "item created");
    Ok(item)
}

pub(super) async fn list_items(state: &AppState) -> Result<Vec<Item>, ApiError> {
    state
        .store
        .list()
        .await
        .map_err(|e| ApiError::from_store(e, Target::None))
}

pub(super) async fn get_item(state: &AppState, item_id: i64) -> Result<Item, ApiError> {
    state
        .store
        .get(item_id)
        .await
        .map_err(|e| ApiError::from_store(e, Target::ItemId(item_id)))
}
