//! Room API tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{body_json, connect_and_join, join_events, token_for, TestApp};

#[tokio::test]
async fn test_create_room_requires_token() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/rooms", &json!({"name": "Movie night"}).to_string())
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_room_rejects_bad_token() {
    let app = TestApp::new();

    let response = app
        .post_json_auth(
            "/api/rooms",
            &json!({"name": "Movie night"}).to_string(),
            "not-a-jwt",
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_get_room() {
    let app = TestApp::new();
    let token = token_for("alice");
    let body = json!({
        "roomId": "friday-film",
        "name": "Friday film",
        "type": "youtube",
        "url": "dQw4w9WgXcQ"
    });

    let response = app
        .post_json_auth("/api/rooms", &body.to_string(), &token)
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["roomId"], "friday-film");
    assert_eq!(created["mediaType"], "youtube");
    assert_eq!(created["createdBy"], "user-alice");
    assert!(created.get("live").is_none());

    let response = app.get_auth("/api/rooms/friday-film", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["name"], "Friday film");
    assert_eq!(fetched["mediaRef"], "dQw4w9WgXcQ");
}

#[tokio::test]
async fn test_duplicate_room_id_conflicts() {
    let app = TestApp::with_rooms(&["taken"]);
    let body = json!({"roomId": "taken", "name": "Again", "type": "upload"});

    let response = app
        .post_json_auth("/api/rooms", &body.to_string(), &token_for("bob"))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_create_request() {
    let app = TestApp::new();
    let body = json!({"name": "", "type": "upload"});

    let response = app
        .post_json_auth("/api/rooms", &body.to_string(), &token_for("bob"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_whitespace_name_is_rejected() {
    let app = TestApp::new();
    let body = json!({"roomId": "blank", "name": "   ", "type": "upload"});

    let response = app
        .post_json_auth("/api/rooms", &body.to_string(), &token_for("bob"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let lookup = app.get_auth("/api/rooms/blank", &token_for("bob")).await;
    assert_eq!(lookup.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_room_is_not_found() {
    let app = TestApp::new();

    let response = app
        .get_auth("/api/rooms/nowhere", &token_for("carol"))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_room_includes_live_members() {
    let app = TestApp::with_rooms(&["lobby"]);
    let addr = app.spawn().await;
    let mut ws = connect_and_join(addr, "dave", "lobby").await;
    join_events(&mut ws).await;

    let response = app.get_auth("/api/rooms/lobby", &token_for("erin")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let members = body["live"]["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["username"], "dave");
    assert_eq!(body["live"]["playback"]["isPlaying"], false);
}
