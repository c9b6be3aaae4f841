//! Tests for the `/scores` HTTP API and the REST leaderboard client.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use swap_puzzle::{
    LeaderboardError, LeaderboardStore, REQUIRED_MESSAGE, RestLeaderboard, ScoreRecord,
    ScoreRepository, router,
};

/// Store whose backend is always down.
struct BrokenStore;

#[async_trait]
impl LeaderboardStore for BrokenStore {
    async fn list_top(&self, _limit: i64) -> Result<Vec<ScoreRecord>, LeaderboardError> {
        Err(LeaderboardError::Storage("disk on fire".to_string()))
    }

    async fn submit(&self, _name: &str, _score: i32) -> Result<ScoreRecord, LeaderboardError> {
        Err(LeaderboardError::Storage("disk on fire".to_string()))
    }
}

fn test_app() -> (NamedTempFile, Router) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = ScoreRepository::open(db_path).expect("Open failed");
    (db_file, router(Arc::new(repo)))
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.expect("body").to_bytes();
    serde_json::from_slice(&bytes).expect("json")
}

async fn post_raw(app: &Router, body: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/scores")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response")
}

async fn post(app: &Router, body: Value) -> axum::response::Response {
    post_raw(app, &body.to_string()).await
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

#[tokio::test]
async fn test_empty_leaderboard_is_empty_array() {
    let (_db, app) = test_app();
    let res = get(&app, "/scores").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!([]));
}

#[tokio::test]
async fn test_post_creates_camel_case_record() {
    let (_db, app) = test_app();
    let res = post(&app, json!({ "playerName": "Ada", "score": 5 })).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = json_body(res).await;
    assert_eq!(body["playerName"], "Ada");
    assert_eq!(body["score"], 5);
    assert!(body["id"].as_i64().is_some());
    assert!(body["createdAt"].as_str().is_some());
}

#[tokio::test]
async fn test_leaderboard_top_ten_best_first() {
    let (_db, app) = test_app();
    for (i, score) in [3, 6, 1, 6, 0, 2, 5, 4, 2, 1, 3, 0].iter().enumerate() {
        let res = post(&app, json!({ "playerName": format!("P{i}"), "score": score })).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let body = json_body(get(&app, "/scores").await).await;
    let rows = body.as_array().expect("array");
    assert_eq!(rows.len(), 10);
    let scores: Vec<i64> = rows.iter().filter_map(|r| r["score"].as_i64()).collect();
    assert_eq!(scores, vec![6, 6, 5, 4, 3, 3, 2, 2, 1, 1]);
    // Ties keep arrival order.
    assert_eq!(rows[0]["playerName"], "P1");
    assert_eq!(rows[1]["playerName"], "P3");
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let (_db, app) = test_app();
    for body in [
        json!({ "score": 3 }),
        json!({ "playerName": "Ada" }),
        json!({ "playerName": "", "score": 3 }),
        json!({ "playerName": "Ada", "score": "three" }),
    ] {
        let res = post(&app, body).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"], REQUIRED_MESSAGE);
    }
}

#[tokio::test]
async fn test_bad_scores_and_malformed_json_rejected() {
    let (_db, app) = test_app();
    for body in [
        json!({ "playerName": "Ada", "score": 2.5 }),
        json!({ "playerName": "Ada", "score": -1 }),
        json!({ "playerName": "x".repeat(65), "score": 1 }),
    ] {
        let res = post(&app, body).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(res).await["error"].as_str().is_some());
    }
    let res = post_raw(&app, "{not json").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Nothing was stored.
    assert_eq!(json_body(get(&app, "/scores").await).await, json!([]));
}

#[tokio::test]
async fn test_storage_failures_are_500() {
    let app = router(Arc::new(BrokenStore));
    let res = get(&app, "/scores").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(res).await["error"], "Failed to fetch scores");

    let res = post(&app, json!({ "playerName": "Ada", "score": 1 })).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(res).await["error"], "Failed to create score");
}

#[tokio::test]
async fn test_health() {
    let (_db, app) = test_app();
    let res = get(&app, "/health").await;
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = res.into_body().collect().await.expect("body").to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_rest_client_round_trip() {
    let (_db, app) = test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let client = RestLeaderboard::new(format!("http://{addr}/"));
    let saved = client.submit("Ada", 4).await.expect("submit");
    assert_eq!(saved.player_name(), "Ada");
    client.submit("Grace", 6).await.expect("submit");

    let top = client.list_top(10).await.expect("list");
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].player_name(), "Grace");

    let err = client.submit("Ada", -3).await.expect_err("negative score");
    assert!(matches!(err, LeaderboardError::Validation(_)));
}
