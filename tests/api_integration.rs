//! Integration tests for the HTTP share server

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use clickjudge::core::{create_router, DirectoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

fn create_test_router(dir: &tempfile::TempDir) -> axum::Router {
    create_router(DirectoryStore::new(dir.path()))
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_scores(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/scores")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn sample_document() -> Value {
    json!({
        "videoId": "dQw4w9WgXcQ",
        "videoUrl": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "judgeName": "Ana",
        "entries": [[2.0, 2], [7.5, -1]]
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_router(&dir);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_share_then_fetch() {
    let dir = tempfile::tempdir().unwrap();

    let response = create_test_router(&dir)
        .oneshot(post_scores(&sample_document()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let hash = created["hash"].as_str().unwrap().to_string();
    assert_eq!(created["url"], format!("/scores/{}", hash));

    let response = create_test_router(&dir)
        .oneshot(
            Request::builder()
                .uri(format!("/scores/{}", hash))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = body_json(response).await;
    assert_eq!(fetched["hash"], hash.as_str());
    assert_eq!(fetched["entries"], sample_document()["entries"]);
    assert_eq!(fetched["judgeName"], "Ana");
}

#[tokio::test]
async fn test_invalid_document_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut document = sample_document();
    document["entries"] = json!([[5, 1], [3, 1], [3, 1]]);

    let response = create_test_router(&dir)
        .oneshot(post_scores(&document))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("does not come after"));
    assert_eq!(std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
}

#[tokio::test]
async fn test_unknown_hash_not_found() {
    let dir = tempfile::tempdir().unwrap();

    let response = create_test_router(&dir)
        .oneshot(
            Request::builder()
                .uri("/scores/000000000000000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Unable to find score (ID: 000000000000000000000000)");
}
