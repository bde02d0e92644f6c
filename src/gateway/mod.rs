//! Axum-based HTTP gateway: authenticated command execution, file access
//! and item storage behind one API key.
//!
//! Every protected route passes through [`auth::require_api_key`] before
//! its extractors run, and through the [`SecurityPolicy`] before any
//! process is spawned or any path is touched.

mod auth;
mod error;
mod handlers;
mod operation;
mod ops;
mod server;

pub use error::{ApiError, Target};
pub use operation::{
    ApiRequest, CommandParams, ItemIdParams, ItemParams, Operation, PathParams, WriteParams,
};
pub use ops::WriteResponse;
pub use server::{build_app, request_timeout, run_gateway, run_gateway_with_listener};

use crate::config::Config;
use crate::exec::CommandRunner;
use crate::files::FileGateway;
use crate::security::SecurityPolicy;
use crate::store::ItemStore;
use std::sync::Arc;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub policy: Arc<SecurityPolicy>,
    pub runner: Arc<dyn CommandRunner>,
    pub files: Arc<FileGateway>,
    pub store: Arc<dyn ItemStore>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        policy: Arc<SecurityPolicy>,
        runner: Arc<dyn CommandRunner>,
        store: Arc<dyn ItemStore>,
    ) -> Self {
        let files = Arc::new(FileGateway::new(Arc::clone(&policy)));
        Self {
            config,
            policy,
            runner,
            files,
            store,
        }
    }
}
