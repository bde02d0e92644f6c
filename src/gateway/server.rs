use super::AppState;
use super::auth::require_api_key;
use super::handlers::{
    handle_api, handle_cli_body, handle_cli_query, handle_create_item, handle_get_item,
    handle_health, handle_list_items, handle_read_file, handle_write_file,
};

use crate::config::Config;
use crate::exec::{CommandRunner, ShellExecutor};
use crate::security::SecurityPolicy;
use crate::store::{ItemStore, SqliteItemStore};
use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderName, Method, StatusCode, header},
    middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Slack on top of the command deadline so a timed-out command still gets
/// its own 504 `execution_timeout` body instead of the layer's empty 408.
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

pub fn request_timeout(config: &Config) -> Duration {
    config.exec.timeout().saturating_add(REQUEST_TIMEOUT_SLACK)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn run_gateway(config: Arc<Config>) -> Result<()> {
    let host = config.gateway.host.as_str();
    let port = config.gateway.port;

    // ── Security: refuse public bind without explicit opt-in ──
    if config.gateway.is_public_bind() && !config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the gateway would be exposed beyond this machine.\n\
             Fix: use --host 127.0.0.1 (default), or set\n\
             [gateway] allow_public_bind = true in config.toml (NOT recommended)."
        );
    }

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(listener, config).await
}

async fn build_gateway_state(config: Arc<Config>) -> Result<AppState> {
    let policy = Arc::new(SecurityPolicy::from_config(
        &config.security,
        &config.workspace_dir,
    ));
    let runner: Arc<dyn CommandRunner> = Arc::new(ShellExecutor::new(
        policy.workspace_dir.clone(),
        config.exec.max_output_bytes,
    ));
    let store_path = config.store_path();
    let store: Arc<dyn ItemStore> = Arc::new(
        SqliteItemStore::open(&store_path)
            .await
            .with_context(|| format!("open item store at {}", store_path.display()))?,
    );
    Ok(AppState::new(config, policy, runner, store))
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
) -> Result<()> {
    let actual_port = listener
        .local_addr()
        .context("get gateway listener local address")?
        .port();
    let display_addr = format!("{}:{actual_port}", config.gateway.host);

    let state = build_gateway_state(config).await?;
    print_gateway_banner(&display_addr, &state);

    let app = build_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP gateway")?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

fn print_gateway_banner(display_addr: &str, state: &AppState) {
    println!("Gateway listening on {display_addr}");
    println!("  GET  /health");
    println!("  GET  /cli?command=...");
    println!("  POST /cli");
    println!("  GET  /read-file?path=...");
    println!("  POST /write-file");
    println!("  GET  /items");
    println!("  POST /items");
    println!("  GET  /items/{{item_id}}");
    println!("  POST /api");
    println!("  Security level: {}", state.policy.tier);
    println!("  Working directory: {}", state.policy.workspace_dir.display());
    for prefix in &state.policy.allowed_paths {
        println!("  Allowed path: {}", prefix.display());
    }
}

/// Assemble the router. `/health` is public; everything else requires
/// `X-API-Key`.
pub fn build_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    let protected = Router::new()
        .route("/cli", get(handle_cli_query).post(handle_cli_body))
        .route("/read-file", get(handle_read_file))
        .route("/write-file", post(handle_write_file))
        .route("/items", get(handle_list_items).post(handle_create_item))
        .route("/items/{item_id}", get(handle_get_item))
        .route("/api", post(handle_api))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let mut app = Router::new()
        .route("/health", get(handle_health))
        .merge(protected)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.gateway.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout(&config),
        ));

    if !config.gateway.cors_origins.is_empty() {
        let origins: Vec<_> = config
            .gateway
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([
                    header::CONTENT_TYPE,
                    HeaderName::from_static(crate::security::API_KEY_HEADER),
                ]),
        );
    }

    app
}
