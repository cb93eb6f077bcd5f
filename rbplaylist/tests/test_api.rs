use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use rbplaylist::api::{radio_api_router, RadioApiState};
use rbplaylist::{Coordinator, PushSecret, Track};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "hunter2";

fn router() -> (Router, Coordinator) {
    let radio = Coordinator::new();
    radio.seed(Track::from_link(
        "https://youtu.be/fB63ztKnGvo",
        "Disclosure",
        "Omen",
        "",
    ));
    let state = RadioApiState::new(radio.clone(), PushSecret::new(Some(SECRET)));
    (radio_api_router(state), radio)
}

fn request(method: Method, uri: &str, body: Option<Value>, secret: bool) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if secret {
        builder = builder.header("x-radio-secret", SECRET);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_mutations_require_secret() {
    let (router, radio) = router();

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/queues/general/songs",
            Some(json!({"reference": "Disclosure - Omen"})),
            false,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
    assert!(radio.queue_names().is_empty());

    // Lecture libre
    let (status, body) = send(&router, request(Method::GET, "/tracks", None, false)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["display_name"], "Disclosure - Omen");
}

#[tokio::test]
async fn test_enqueue_and_play() {
    let (router, _radio) = router();

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/queues/general/songs",
            Some(json!({"reference": "https://youtu.be/dQw4w9WgXcQ", "contributor": "cyle"})),
            true,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "dQw4w9WgXcQ");
    assert_eq!(body["contributor"], "cyle");

    let (status, _) = send(&router, request(Method::GET, "/now", None, false)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &router,
        request(Method::POST, "/queues/general/current", None, true),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["track"]["id"], "dQw4w9WgXcQ");
    assert_eq!(body["queue"], "general");

    let (status, body) = send(&router, request(Method::GET, "/now", None, false)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["label"],
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ (added by cyle)"
    );
}

#[tokio::test]
async fn test_error_statuses() {
    let (router, _radio) = router();

    let cases = [
        (
            request(
                Method::POST,
                "/queues/general/songs",
                Some(json!({"reference": "Unknown Band - Unknown Song"})),
                true,
            ),
            StatusCode::NOT_FOUND,
        ),
        (
            request(
                Method::POST,
                "/queues/general/songs",
                Some(json!({"reference": "whatever"})),
                true,
            ),
            StatusCode::BAD_REQUEST,
        ),
        (
            request(Method::POST, "/queues/nope/next", None, true),
            StatusCode::NOT_FOUND,
        ),
        (
            request(
                Method::PUT,
                "/tracks",
                Some(json!({"link": "https://vimeo.com/1", "artist": "a", "title": "b"})),
                true,
            ),
            StatusCode::BAD_REQUEST,
        ),
        (
            request(Method::DELETE, "/tracks/ghost", None, true),
            StatusCode::NOT_FOUND,
        ),
    ];

    for (req, expected) in cases {
        let uri = req.uri().to_string();
        let (status, body) = send(&router, req).await;
        assert_eq!(status, expected, "{}: {}", uri, body);
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn test_empty_queue_is_conflict() {
    let (router, radio) = router();
    radio
        .resolve_and_add("general", "Disclosure - Omen", "")
        .unwrap();

    let (status, body) = send(
        &router,
        request(Method::DELETE, "/queues/general/songs/0", None, true),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "fB63ztKnGvo");

    let (status, body) = send(
        &router,
        request(Method::POST, "/queues/general/shuffle", None, true),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "EMPTY_COLLECTION");
}

#[tokio::test]
async fn test_set_and_patch_track() {
    let (router, _radio) = router();

    let (status, body) = send(
        &router,
        request(
            Method::PUT,
            "/tracks",
            Some(json!({
                "link": "https://youtu.be/9bZkp7q19f0",
                "artist": "PSY",
                "title": "Gangnam Style"
            })),
            true,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], true);
    assert_eq!(body["track"]["id"], "9bZkp7q19f0");

    let (status, body) = send(
        &router,
        request(
            Method::PATCH,
            "/tracks/9bZkp7q19f0",
            Some(json!({"title": "Gangnam Style (Official)"})),
            true,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "PSY - Gangnam Style (Official)");

    let (status, _) = send(
        &router,
        request(Method::PATCH, "/tracks/9bZkp7q19f0", Some(json!({})), true),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
