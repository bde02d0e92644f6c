use super::error::{ApiError, Target};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Body of `POST /api`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRequest {
    pub operation: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandParams {
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathParams {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WriteParams {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemParams {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemIdParams {
    pub item_id: i64,
}

/// Closed set of operations the unified endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ExecuteCommand(CommandParams),
    ReadFile(PathParams),
    WriteFile(WriteParams),
    CreateItem(ItemParams),
    ListItems,
    GetItem(ItemIdParams),
}

fn params<T: DeserializeOwned>(operation: &str, params: Value) -> Result<T, ApiError> {
    let params = if params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| {
        ApiError::bad_request(
            Target::Operation(operation.to_string()),
            format!("invalid params for {operation}: {e}"),
        )
    })
}

impl TryFrom<ApiRequest> for Operation {
    type Error = ApiError;

    fn try_from(request: ApiRequest) -> Result<Self, Self::Error> {
        let op = request.operation.trim();
        match op {
            "cli" | "execute_command" => Ok(Self::ExecuteCommand(params(op, request.params)?)),
            "read_file" => Ok(Self::ReadFile(params(op, request.params)?)),
            "write_file" => Ok(Self::WriteFile(params(op, request.params)?)),
            "create_item" => Ok(Self::CreateItem(params(op, request.params)?)),
            "list_items" => Ok(Self::ListItems),
            "get_item" => Ok(Self::GetItem(params(op, request.params)?)),
            other => Err(ApiError::bad_request(
                Target::Operation(other.to_string()),
                format!(
                    "unknown operation: {other}. Expected one of cli, read_file, write_file, \
                     create_item, list_items, get_item"
                ),
            )),
        }
    }
}
