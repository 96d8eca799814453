//! Both tiers on ephemeral ports, driven over real HTTP

use ferrumkv::dispatch::Dispatcher;
use ferrumkv::gateway::{ErrorResponse, RetrieveResponse, StatusResponse};
use ferrumkv::{server, web, Gateway, MemoryStore, RemoteClient};
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

struct TestEnv {
    base_url: String,
    shutdown: CancellationToken,
    http: reqwest::Client,
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn spawn_gateway(storage_addr: String, shutdown: &CancellationToken) -> String {
    let client = RemoteClient::new(storage_addr, Duration::from_millis(500));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(web::serve(listener, Arc::new(Gateway::new(client)), shutdown.clone()));
    format!("http://{}", addr)
}

async fn setup() -> TestEnv {
    let shutdown = CancellationToken::new();

    let storage = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let storage_addr = storage.local_addr().unwrap().to_string();
    let dispatcher = Dispatcher::new(Arc::new(MemoryStore::new()));
    tokio::spawn(server::serve(storage, dispatcher, shutdown.clone()));

    let base_url = spawn_gateway(storage_addr, &shutdown).await;
    TestEnv { base_url, shutdown, http: reqwest::Client::new() }
}

#[tokio::test]
async fn test_set_get_delete_workflow() {
    let env = setup().await;
    let url = format!("{}/kv", env.base_url);

    let resp = env.http.post(&url).json(&json!({"key": "a", "value": "1"})).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: StatusResponse = resp.json().await.unwrap();
    assert!(body.success);

    let resp = env.http.get(format!("{}/a", url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: RetrieveResponse = resp.json().await.unwrap();
    assert!(body.found);
    assert_eq!(body.value.as_deref(), Some("1"));

    let resp = env.http.delete(format!("{}/a", url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = env.http.get(format!("{}/a", url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: RetrieveResponse = resp.json().await.unwrap();
    assert!(!body.found);

    let resp = env.http.delete(format!("{}/a", url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: StatusResponse = resp.json().await.unwrap();
    assert!(!body.success);
}

#[tokio::test]
async fn test_overwrite_and_empty_value() {
    let env = setup().await;
    let url = format!("{}/kv", env.base_url);

    for value in ["first", "second", ""] {
        let resp = env.http.post(&url).json(&json!({"key": "k", "value": value})).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let body: RetrieveResponse = env.http.get(format!("{}/k", url)).send().await.unwrap().json().await.unwrap();
    assert!(body.found);
    assert_eq!(body.value.as_deref(), Some(""));
}

#[tokio::test]
async fn test_malformed_store_requests() {
    let env = setup().await;
    let url = format!("{}/kv", env.base_url);

    let resp = env.http.post(&url).json(&json!({"key": "a"})).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert!(body.error.contains("value"));

    let resp = env
        .http
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Nothing was stored by the rejected request
    let resp = env.http.get(format!("{}/a", url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_key_in_address() {
    let env = setup().await;

    let resp = env.http.get(format!("{}/kv/", env.base_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = env.http.delete(format!("{}/kv/", env.base_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let env = setup().await;

    let resp = env.http.get(format!("{}/health", env.base_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_storage_unreachable_is_server_error() {
    let shutdown = CancellationToken::new();

    // Reserve a port, then free it so nothing is listening there
    let unused = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = unused.local_addr().unwrap().to_string();
    drop(unused);

    let base_url = spawn_gateway(dead_addr, &shutdown).await;
    let http = reqwest::Client::new();

    let resp = http.get(format!("{}/kv/a", base_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert!(body.error.starts_with("Failed to get key"));

    let resp = http.get(format!("{}/health", base_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    shutdown.cancel();
}

#[tokio::test]
async fn test_concurrent_clients() {
    let env = setup().await;
    let url = format!("{}/kv", env.base_url);

    let mut handles = Vec::new();
    for i in 0..20 {
        let http = env.http.clone();
        let url = url.clone();
        handles.push(tokio::spawn(async move {
            let key = format!("key-{}", i);
            let resp = http.post(&url).json(&json!({"key": key, "value": i.to_string()})).send().await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);

            let body: RetrieveResponse = http.get(format!("{}/{}", url, key)).send().await.unwrap().json().await.unwrap();
            assert_eq!(body.value, Some(i.to_string()));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}
