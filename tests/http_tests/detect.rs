//! Stories about proxying detection traffic through a running server

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;

use super::fake::InMemoryControlPlane;
use super::{app, closed_addr, spawn_server, template_file, TEMPLATE};

/// Story: the inference service answers and the caller sees it untouched
#[tokio::test]
async fn story_detect_response_is_relayed_verbatim() {
    let backend = Router::new().route(
        "/detect",
        post(|| async {
            (
                StatusCode::CREATED,
                [("x-trace", "abc"), ("content-type", "application/json")],
                r#"{"ok":true}"#,
            )
        }),
    );
    let (backend_addr, backend_stop) = spawn_server(backend).await;

    let file = template_file(TEMPLATE);
    let manager = app(
        file.path(),
        Arc::new(InMemoryControlPlane::default()),
        &format!("http://{}/detect", backend_addr),
    );
    let (manager_addr, manager_stop) = spawn_server(manager).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/detect", manager_addr))
        .header("content-type", "application/json")
        .body(r#"{"image_urls":["https://example.com/cat.jpg"]}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers().get("x-trace").unwrap(), "abc");
    assert_eq!(response.text().await.unwrap(), r#"{"ok":true}"#);

    manager_stop.cancel();
    backend_stop.cancel();
}

#[tokio::test]
async fn test_detect_forwards_caller_headers_and_body() {
    let backend = Router::new().route(
        "/detect",
        post(|headers: HeaderMap, body: String| async move {
            let trace = headers
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("none")
                .to_string();
            format!("{}:{}", trace, body)
        }),
    );
    let (backend_addr, backend_stop) = spawn_server(backend).await;

    let file = template_file(TEMPLATE);
    let manager = app(
        file.path(),
        Arc::new(InMemoryControlPlane::default()),
        &format!("http://{}/detect", backend_addr),
    );
    let (manager_addr, manager_stop) = spawn_server(manager).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/detect", manager_addr))
        .header("x-request-id", "req-42")
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "req-42:payload");

    manager_stop.cancel();
    backend_stop.cancel();
}

/// Story: the RayService is not up yet
///
/// The caller gets a 502 naming the backend, and the manager keeps serving.
#[tokio::test]
async fn story_backend_down_is_bad_gateway() {
    let target = format!("http://{}/detect", closed_addr().await);
    let file = template_file(TEMPLATE);
    let manager = app(
        file.path(),
        Arc::new(InMemoryControlPlane::default()),
        &target,
    );
    let (manager_addr, manager_stop) = spawn_server(manager).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/detect", manager_addr))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(response.text().await.unwrap().contains(&target));

    // Still alive
    let health = client
        .get(format!("http://{}/healthz", manager_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    manager_stop.cancel();
}
