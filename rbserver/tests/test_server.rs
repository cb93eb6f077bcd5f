use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::State,
    http::{Request, StatusCode},
    routing::get,
};
use rbserver::ServerBuilder;
use tower::ServiceExt;
use utoipa::OpenApi;

async fn get_body(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn count(State(n): State<u32>) -> Json<u32> {
    Json(n)
}

#[derive(OpenApi)]
#[openapi()]
struct EmptyDoc;

#[tokio::test]
async fn test_routes_are_mounted() {
    let mut server = ServerBuilder::new("Test", "localhost", 0).build();

    server
        .add_route("/api/status", || async { serde_json::json!({"status": "on air"}) })
        .await;
    server.add_handler_with_state("/count", count, 7u32).await;
    server
        .add_router("/sub", Router::new().route("/ping", get(|| async { "pong" })))
        .await;
    server
        .add_openapi(
            Router::new().route("/hello", get(|| async { "hi" })),
            EmptyDoc::openapi(),
            "demo",
        )
        .await;

    let router = server.router().await;

    let (status, body) = get_body(router.clone(), "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("on air"));

    let (_, body) = get_body(router.clone(), "/count").await;
    assert_eq!(body, "7");

    let (_, body) = get_body(router.clone(), "/sub/ping").await;
    assert_eq!(body, "pong");

    let (_, body) = get_body(router.clone(), "/api/demo/hello").await;
    assert_eq!(body, "hi");

    let (status, _) = get_body(router, "/api-docs/demo.json").await;
    assert_eq!(status, StatusCode::OK);
}

#[test]
fn test_info() {
    let server = ServerBuilder::new("Radio", "10.0.0.2", 1234)
        .name("RadioBot")
        .http_port(4321)
        .build();
    let info = server.info();
    assert_eq!(info.name, "RadioBot");
    assert_eq!(info.base_url, "10.0.0.2");
    assert_eq!(info.http_port, 4321);
}
