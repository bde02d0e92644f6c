use crate::harness::{API_KEY, GatewayTestServer, SpyRunner};
use reqwest::StatusCode;
use serde_json::{Value, json};
use sysgate::security::SecurityTier;

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn blocked_command_is_forbidden_without_spawning() {
    let server = GatewayTestServer::start(SecurityTier::Medium).await;

    let response = client()
        .post(server.url("/cli"))
        .header("X-API-Key", API_KEY)
        .json(&json!({ "command": "rm -rf /" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "policy_denied");
    assert_eq!(body["reason"], "blocked pattern");
    assert!(server.runner.calls().is_empty());
}

#[tokio::test]
async fn listing_command_returns_structured_listing() {
    let listing = "total 8\n\
                   drwxr-xr-x 2 u g 4096 Jan 1 00:00 .\n\
                   drwxr-xr-x 3 u g 4096 Jan 1 00:00 ..\n\
                   -rw-r--r-- 1 u g   12 Jan 1 00:00 notes.txt\n\
                   drwxr-xr-x 2 u g 4096 Jan 1 00:00 src\n";
    let server =
        GatewayTestServer::start_with(SecurityTier::High, SpyRunner::replying(listing)).await;

    let response = client()
        .get(server.url("/cli"))
        .query(&[("command", "ls -la")])
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "command_listing");
    let listing = &body["structured_listing"];
    assert_eq!(listing["files"][0]["name"], "notes.txt");
    assert_eq!(listing["directories"][0]["name"], "src");
    assert_eq!(server.runner.calls(), vec!["ls -la".to_string()]);
}

#[tokio::test]
async fn write_then_read_round_trip() {
    let server = GatewayTestServer::start(SecurityTier::Medium).await;

    let response = client()
        .post(server.url("/write-file"))
        .header("X-API-Key", API_KEY)
        .json(&json!({ "path": "out/report.md", "content": "# Report\nall good\n" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let written = server.root.join("out/report.md");
    assert_eq!(body["path"], json!(written));
    assert_eq!(
        std::fs::read_to_string(&written).unwrap(),
        "# Report\nall good\n"
    );

    let response = client()
        .get(server.url("/read-file"))
        .query(&[("path", "out/report.md")])
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["content"], "# Report\nall good\n");
    assert_eq!(body["target_path"], json!(written));
}

#[tokio::test]
async fn write_outside_workspace_is_forbidden() {
    let server = GatewayTestServer::start(SecurityTier::Medium).await;

    let response = client()
        .post(server.url("/write-file"))
        .header("X-API-Key", API_KEY)
        .json(&json!({ "path": "../escape.txt", "content": "x" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!server.root.parent().unwrap().join("escape.txt").exists());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let server = GatewayTestServer::start(SecurityTier::Medium).await;

    let response = client()
        .post(server.url("/write-file"))
        .header("X-API-Key", API_KEY)
        .header("content-type", "application/json")
        .body(r#"{"path": "a.txt"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn items_flow_with_duplicate_and_missing() {
    let server = GatewayTestServer::start(SecurityTier::Medium).await;

    let create = |name: &'static str| {
        client()
            .post(server.url("/items"))
            .header("X-API-Key", API_KEY)
            .json(&json!({ "name": name, "description": "thing" }))
            .send()
    };

    let first: Value = create("alpha").await.unwrap().json().await.unwrap();
    let second: Value = create("beta").await.unwrap().json().await.unwrap();
    assert!(second["id"].as_i64().unwrap() > first["id"].as_i64().unwrap());

    let duplicate = create("alpha").await.unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let listed: Value = client()
        .get(server.url("/items"))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "beta"]);

    let fetched = client()
        .get(server.url(&format!("/items/{}", first["id"])))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(fetched.json::<Value>().await.unwrap(), first);

    let missing = client()
        .get(server.url("/items/9999"))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let bad_id = client()
        .get(server.url("/items/abc"))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unified_endpoint_dispatches_operations() {
    let server = GatewayTestServer::start(SecurityTier::Medium).await;
    let call = |body: Value| {
        client()
            .post(server.url("/api"))
            .header("X-API-Key", API_KEY)
            .json(&body)
            .send()
    };

    let response = call(json!({
        "operation": "write_file",
        "params": { "path": "api.txt", "content": "via api" }
    }))
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = call(json!({ "operation": "read_file", "params": { "path": "api.txt" } }))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["content"], "via api");

    let response = call(json!({ "operation": "execute_command", "params": { "command": "date" } }))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.runner.calls(), vec!["date".to_string()]);

    let response = call(json!({ "operation": "get_item", "params": {} }))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = call(json!({ "operation": "drop_tables" })).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
