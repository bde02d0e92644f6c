use crate::harness::{API_KEY, wait_until_gateway_ready};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use sysgate::config::Config;
use sysgate::gateway::run_gateway_with_listener;
use tempfile::TempDir;

#[cfg(unix)]
#[tokio::test]
async fn real_shell_runs_in_the_workspace() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path().canonicalize().unwrap();
    std::fs::write(root.join("marker.txt"), "here").unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut config = Config::default();
    config.workspace_dir = root.clone();
    config.api_key = Some(API_KEY.to_string());
    config.store.path = Some(root.join("items.sqlite3"));
    let handle = tokio::spawn(run_gateway_with_listener(listener, Arc::new(config)));
    wait_until_gateway_ready(port).await;

    let response = reqwest::Client::new()
        .get(format!("http://127.0.0.1:{port}/cli"))
        .query(&[("command", "cat marker.txt && pwd")])
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let output = body["output"].as_str().unwrap();
    assert!(output.starts_with("here"), "{output}");
    assert!(output.contains(root.to_str().unwrap()), "{output}");
    assert_eq!(body["exit_status"], 0);

    handle.abort();
}

#[tokio::test]
async fn body_over_the_limit_is_rejected() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path().canonicalize().unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut config = Config::default();
    config.workspace_dir = root.clone();
    config.api_key = Some(API_KEY.to_string());
    config.store.path = Some(root.join("items.sqlite3"));
    config.gateway.max_body_bytes = 64;
    let handle = tokio::spawn(run_gateway_with_listener(listener, Arc::new(config)));
    wait_until_gateway_ready(port).await;

    let content = "x".repeat(1024);
    let response = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/write-file"))
        .header("X-API-Key", API_KEY)
        .json(&serde_json::json!({ "path": "big.txt", "content": content }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!root.join("big.txt").exists());

    handle.abort();
}
