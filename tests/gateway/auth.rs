use crate::harness::{API_KEY, GatewayTestServer};
use reqwest::StatusCode;
use serde_json::{Value, json};
use sysgate::security::SecurityTier;

#[tokio::test]
async fn health_is_public() {
    let server = GatewayTestServer::start(SecurityTier::Medium).await;

    let response = reqwest::get(server.url("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["security_level"], "medium");
}

#[tokio::test]
async fn wrong_key_is_rejected_before_any_side_effect() {
    let server = GatewayTestServer::start(SecurityTier::Low).await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/cli"))
        .query(&[("command", "echo hi")])
        .header("X-API-Key", "not-the-key")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "authentication_failed");

    let response = client
        .post(server.url("/write-file"))
        .header("X-API-Key", "not-the-key")
        .json(&json!({ "path": "sneaky.txt", "content": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert!(server.runner.calls().is_empty());
    assert!(!server.root.join("sneaky.txt").exists());
}

#[tokio::test]
async fn missing_key_is_rejected_on_every_protected_route() {
    let server = GatewayTestServer::start(SecurityTier::Medium).await;
    let client = reqwest::Client::new();

    for (method, path) in [
        ("GET", "/cli?command=ls"),
        ("POST", "/cli"),
        ("GET", "/read-file?path=x"),
        ("POST", "/write-file"),
        ("GET", "/items"),
        ("POST", "/items"),
        ("GET", "/items/1"),
        ("POST", "/api"),
    ] {
        let request = match method {
            "GET" => client.get(server.url(path)),
            _ => client.post(server.url(path)).json(&json!({})),
        };
        let response = request.send().await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {path}"
        );
    }
}

#[tokio::test]
async fn auth_runs_before_body_parsing() {
    let server = GatewayTestServer::start(SecurityTier::Medium).await;

    let response = reqwest::Client::new()
        .post(server.url("/api"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn correct_key_is_accepted() {
    let server = GatewayTestServer::start(SecurityTier::Medium).await;

    let response = reqwest::Client::new()
        .get(server.url("/items"))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!([]));
}
