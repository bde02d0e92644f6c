#![allow(dead_code)]

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use sysgate::config::Config;
use sysgate::error::ExecError;
use sysgate::exec::{CommandResult, CommandRunner};
use sysgate::gateway::{AppState, build_app};
use sysgate::security::{SecurityPolicy, SecurityTier};
use sysgate::store::{ItemStore, SqliteItemStore};
use tempfile::TempDir;

pub const API_KEY: &str = "integration-test-key";

/// Answers every command with `stdout` and remembers what it was asked to run.
#[derive(Default)]
pub struct SpyRunner {
    calls: Mutex<Vec<String>>,
    stdout: String,
}

impl SpyRunner {
    pub fn replying(stdout: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            stdout: stdout.to_string(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for SpyRunner {
    fn run<'a>(
        &'a self,
        command: &'a str,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<CommandResult, ExecError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(command.to_string());
            Ok(CommandResult {
                exit_status: 0,
                stdout: self.stdout.clone(),
                stderr: String::new(),
                executed_command: command.to_string(),
                timed_out: false,
                duration_ms: 1,
            })
        })
    }
}

pub struct GatewayTestServer {
    pub port: u16,
    pub root: PathBuf,
    pub runner: Arc<SpyRunner>,
    handle: tokio::task::JoinHandle<()>,
    _workspace: TempDir,
}

impl GatewayTestServer {
    pub async fn start(tier: SecurityTier) -> Self {
        Self::start_with(tier, SpyRunner::replying("ok\n")).await
    }

    pub async fn start_with(tier: SecurityTier, runner: SpyRunner) -> Self {
        let workspace = TempDir::new().expect("temp workspace should be created");
        let root = workspace
            .path()
            .canonicalize()
            .expect("temp workspace should canonicalize");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let mut config = Config::default();
        config.workspace_dir = root.clone();
        config.api_key = Some(API_KEY.to_string());
        config.security.level = tier;
        let config = Arc::new(config);

        let policy = Arc::new(SecurityPolicy::from_config(&config.security, &root));
        let runner = Arc::new(runner);
        let store: Arc<dyn ItemStore> = Arc::new(
            SqliteItemStore::open(&root.join(".sysgate/items.sqlite3"))
                .await
                .expect("item store should open"),
        );
        let state = AppState::new(
            config,
            policy,
            Arc::clone(&runner) as Arc<dyn CommandRunner>,
            store,
        );

        let app = build_app(state);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        wait_until_gateway_ready(port).await;

        Self {
            port,
            root,
            runner,
            handle,
            _workspace: workspace,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..80 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("gateway did not become ready on port {port}");
}
