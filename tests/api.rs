use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use chug_board_back::{
    config::{AppConfig, StorageBackend},
    dao::chug_store::memory::MemoryStore,
    photos::inline::InlinePhotoStore,
    routes,
    state::{AppState, SharedState},
};

const BOUNDARY: &str = "chug-board-test-boundary";

fn app() -> (SharedState, Router) {
    let mut config = AppConfig::default();
    config.storage.backend = StorageBackend::Memory;
    let state = AppState::new(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(InlinePhotoStore),
    );
    (state.clone(), routes::router(state))
}

fn multipart(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Body {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_attempt(
    app: &Router,
    fields: &[(&str, &str)],
    image: Option<(&str, &[u8])>,
) -> (StatusCode, Value) {
    let request = Request::post("/api/attempts")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(multipart(fields, image))
        .unwrap();
    send(app, request).await
}

async fn create_party(app: &Router, name: &str) -> (StatusCode, Value) {
    let request = Request::post("/api/parties")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": name }).to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn healthcheck_reports_ok_then_degraded() {
    let (state, app) = app();

    let (status, body) = get(&app, "/healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");

    state.update_degraded(true);
    let (_, body) = get(&app, "/healthcheck").await;
    assert_eq!(body["status"], "degraded");

    let (status, body) = get(&app, "/api/attempts").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["message"].as_str().unwrap().contains("degraded"));
}

#[tokio::test]
async fn tied_attempts_rank_in_submission_order() {
    let (_, app) = app();

    let (status, created) = post_attempt(
        &app,
        &[("name", "Alice"), ("time", "2.50"), ("method", "Glass")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["attempt"]["display_time"], "2.50");
    assert_eq!(created["attempt"]["beer_type"], "unknown");
    assert_eq!(created["warnings"], json!([]));

    post_attempt(
        &app,
        &[("name", "Bob"), ("time", "2.50"), ("method", "Can")],
        None,
    )
    .await;

    let (status, board) = get(&app, "/api/attempts").await;
    assert_eq!(status, StatusCode::OK);
    let board = board.as_array().unwrap();
    assert_eq!(board[0]["name"], "Alice");
    assert_eq!(board[0]["rank"], 1);
    assert_eq!(board[0]["medal"], "gold");
    assert_eq!(board[1]["name"], "Bob");
    assert_eq!(board[1]["method"], "Can");
    assert!(board.iter().all(|a| a["sub_three"] == true));
}

#[tokio::test]
async fn invalid_submission_is_a_bad_request() {
    let (_, app) = app();

    let (status, body) = post_attempt(&app, &[("name", "  "), ("time", "0")], None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "validation failed");
    assert!(body["fields"]["name"].is_array());
    assert!(body["fields"]["time"].is_array());

    let (_, board) = get(&app, "/api/attempts").await;
    assert_eq!(board, json!([]));
}

#[tokio::test]
async fn photo_is_returned_as_displayable_url() {
    let (_, app) = app();

    let (status, created) = post_attempt(
        &app,
        &[("name", "Alice"), ("time", "3.40")],
        Some(("image/png", b"hello")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        created["attempt"]["photo_url"],
        "data:image/png;base64,aGVsbG8="
    );
}

#[tokio::test]
async fn delete_is_idempotent() {
    let (_, app) = app();
    let (_, created) = post_attempt(&app, &[("name", "Alice"), ("time", "2.0")], None).await;
    let id = created["attempt"]["id"].as_str().unwrap().to_owned();

    for _ in 0..2 {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/attempts/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (_, board) = get(&app, "/api/attempts").await;
    assert_eq!(board, json!([]));
}

#[tokio::test]
async fn party_leaderboard_and_hall_of_fame() {
    let (_, app) = app();

    let (status, party) = create_party(&app, "Julefrokost").await;
    assert_eq!(status, StatusCode::CREATED);
    let party_id = party["id"].as_str().unwrap().to_owned();

    for (name, time) in [("A", "4.0"), ("B", "2.0"), ("C", "3.0")] {
        let (status, _) = post_attempt(
            &app,
            &[("name", name), ("time", time), ("partyId", party_id.as_str())],
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    post_attempt(&app, &[("name", "Solo"), ("time", "1.5")], None).await;

    let (status, board) = get(&app, &format!("/api/parties/{party_id}/leaderboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["party"]["name"], "Julefrokost");
    assert_eq!(board["attempts"].as_array().unwrap().len(), 3);
    assert_eq!(board["podium"]["center"]["time"], 2.0);
    assert_eq!(board["podium"]["left"]["time"], 3.0);
    assert_eq!(board["podium"]["right"]["time"], 4.0);
    assert_eq!(board["participants"].as_array().unwrap().len(), 3);

    let (_, filtered) = get(&app, &format!("/api/attempts?partyId={party_id}")).await;
    assert_eq!(filtered.as_array().unwrap().len(), 3);

    let (status, fame) = get(&app, "/api/halloffame").await;
    assert_eq!(status, StatusCode::OK);
    let fame = fame.as_array().unwrap();
    assert_eq!(fame.len(), 4);
    assert_eq!(fame[0]["name"], "Solo");
    assert_eq!(fame[0]["party_name"], "Unknown Party");
    assert_eq!(fame[1]["party_name"], "Julefrokost");
}

#[tokio::test]
async fn unknown_party_is_not_found() {
    let (_, app) = app();

    let (status, _) = get(&app, "/api/parties/0191f5c6-0000-7000-8000-000000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = create_party(&app, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
