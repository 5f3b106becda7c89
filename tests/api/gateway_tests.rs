//! WebSocket gateway tests against a live listener

use axum::http::StatusCode;
use serde_json::json;
use tokio_tungstenite::tungstenite;

use watch_party_server::domain::{
    ConnectionHub, ConnectionId, DeliveryError, OutboundFrame, RoomEvent, RoomId,
};

use crate::common::{
    connect_and_join, expect_closed, join_events, next_event, next_event_of, send_json,
    token_for, wait_until, ws_url, TestApp,
};

#[tokio::test]
async fn test_upgrade_without_valid_token_is_rejected() {
    let app = TestApp::with_rooms(&["lobby"]);
    let addr = app.spawn().await;

    for token in ["", "garbage"] {
        let err = tokio_tungstenite::connect_async(ws_url(addr, token, "lobby"))
            .await
            .unwrap_err();

        match err {
            tungstenite::Error::Http(response) => {
                assert_eq!(response.status(), StatusCode::UNAUTHORIZED)
            }
            other => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(app.state.gateway.connection_count(), 0);
}

#[tokio::test]
async fn test_join_sends_room_info_sync_and_presence() {
    let app = TestApp::with_rooms(&["lobby"]);
    let addr = app.spawn().await;
    let mut ws = connect_and_join(addr, "alice", "lobby").await;

    let [info, sync, presence] = join_events(&mut ws).await;

    assert_eq!(info["type"], "room-info");
    assert_eq!(info["roomId"], "lobby");
    assert_eq!(info["mediaType"], "stream");
    assert_eq!(info["role"], "host");
    assert_eq!(sync["type"], "video-sync");
    assert_eq!(sync["currentTime"], 0.0);
    assert_eq!(sync["isPlaying"], false);
    assert_eq!(presence["type"], "members-update");
    assert_eq!(presence["members"][0]["username"], "alice");
    assert_eq!(presence["members"][0]["id"], info["selfId"]);
}

#[tokio::test]
async fn test_unknown_room_gets_error_frame() {
    let app = TestApp::new();
    let addr = app.spawn().await;
    let mut ws = connect_and_join(addr, "alice", "ghost").await;

    let event = next_event(&mut ws).await;

    assert_eq!(event["type"], "error");
    assert_eq!(event["code"], "room-not-found");
    assert!(event.get("seq").is_none());
}

#[tokio::test]
async fn test_sync_reaches_other_members() {
    let app = TestApp::with_rooms(&["lobby"]);
    let addr = app.spawn().await;
    let mut alice = connect_and_join(addr, "alice", "lobby").await;
    join_events(&mut alice).await;
    let mut bob = connect_and_join(addr, "bob", "lobby").await;
    let [bob_info, _, _] = join_events(&mut bob).await;
    assert_eq!(bob_info["role"], "viewer");
    next_event_of(&mut alice, "members-update").await;

    send_json(
        &mut bob,
        json!({"type": "sync-video", "currentTime": 93.5, "isPlaying": true}),
    )
    .await;

    let sync = next_event_of(&mut alice, "video-sync").await;
    assert_eq!(sync["currentTime"], 93.5);
    assert_eq!(sync["isPlaying"], true);
    assert_eq!(sync["updatedBy"], bob_info["selfId"]);
}

#[tokio::test]
async fn test_late_joiner_sees_current_playback() {
    let app = TestApp::with_rooms(&["lobby"]);
    let addr = app.spawn().await;
    let mut alice = connect_and_join(addr, "alice", "lobby").await;
    join_events(&mut alice).await;
    send_json(
        &mut alice,
        json!({"type": "sync-video", "currentTime": 42.0, "isPlaying": false}),
    )
    .await;
    // Round-trip a chat line so the sync is applied before bob joins.
    send_json(&mut alice, json!({"type": "send-message", "message": "ready"})).await;
    next_event_of(&mut alice, "chat-message").await;

    let mut bob = connect_and_join(addr, "bob", "lobby").await;
    let [_, sync, _] = join_events(&mut bob).await;

    assert_eq!(sync["currentTime"], 42.0);
    assert_eq!(sync["isPlaying"], false);
}

#[tokio::test]
async fn test_chat_reaches_everyone_with_same_seq() {
    let app = TestApp::with_rooms(&["lobby"]);
    let addr = app.spawn().await;
    let mut alice = connect_and_join(addr, "alice", "lobby").await;
    join_events(&mut alice).await;
    let mut bob = connect_and_join(addr, "bob", "lobby").await;
    join_events(&mut bob).await;

    send_json(
        &mut alice,
        json!({"type": "send-message", "message": "  popcorn?  "}),
    )
    .await;

    let to_alice = next_event_of(&mut alice, "chat-message").await;
    let to_bob = next_event_of(&mut bob, "chat-message").await;
    assert_eq!(to_alice["text"], "popcorn?");
    assert_eq!(to_alice["username"], "alice");
    assert_eq!(to_alice, to_bob);
}

#[tokio::test]
async fn test_signal_is_relayed_to_target_only() {
    let app = TestApp::with_rooms(&["lobby"]);
    let addr = app.spawn().await;
    let mut alice = connect_and_join(addr, "alice", "lobby").await;
    let [alice_info, _, _] = join_events(&mut alice).await;
    let mut bob = connect_and_join(addr, "bob", "lobby").await;
    let [bob_info, _, _] = join_events(&mut bob).await;
    let offer = json!({"type": "offer", "sdp": "v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1\r\n"});

    send_json(
        &mut alice,
        json!({"type": "signal-offer", "to": bob_info["selfId"], "payload": offer}),
    )
    .await;

    let relayed = next_event_of(&mut bob, "signal-offer").await;
    assert_eq!(relayed["from"], alice_info["selfId"]);
    assert_eq!(relayed["payload"], offer);
}

#[tokio::test]
async fn test_disconnect_updates_presence() {
    let app = TestApp::with_rooms(&["lobby"]);
    let addr = app.spawn().await;
    let mut alice = connect_and_join(addr, "alice", "lobby").await;
    join_events(&mut alice).await;
    let mut bob = connect_and_join(addr, "bob", "lobby").await;
    join_events(&mut bob).await;
    let presence = next_event_of(&mut alice, "members-update").await;
    assert_eq!(presence["members"].as_array().unwrap().len(), 2);

    bob.close(None).await.unwrap();

    let presence = next_event_of(&mut alice, "members-update").await;
    let members = presence["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["username"], "alice");
}

#[tokio::test]
async fn test_unknown_frame_type_keeps_connection_open() {
    let app = TestApp::with_rooms(&["lobby"]);
    let addr = app.spawn().await;
    let mut alice = connect_and_join(addr, "alice", "lobby").await;
    join_events(&mut alice).await;

    send_json(&mut alice, json!({"type": "typing", "active": true})).await;
    send_json(&mut alice, json!({"type": "send-message", "message": "still here"})).await;

    let event = next_event(&mut alice).await;
    assert_eq!(event["type"], "chat-message");
    assert_eq!(event["text"], "still here");
}

#[tokio::test]
async fn test_frame_before_join_is_a_protocol_violation() {
    let app = TestApp::with_rooms(&["lobby"]);
    let addr = app.spawn().await;
    let (mut ws, _) =
        tokio_tungstenite::connect_async(ws_url(addr, &token_for("mallory"), "lobby"))
            .await
            .unwrap();

    send_json(&mut ws, json!({"type": "send-message", "message": "hi"})).await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["type"], "error");
    assert_eq!(event["code"], "protocol-violation");
}

#[tokio::test]
async fn test_media_state_updates_presence() {
    let app = TestApp::with_rooms(&["lobby"]);
    let addr = app.spawn().await;
    let mut alice = connect_and_join(addr, "alice", "lobby").await;
    join_events(&mut alice).await;

    send_json(
        &mut alice,
        json!({"type": "media-state", "hasAudio": true, "hasVideo": false}),
    )
    .await;

    let presence = next_event_of(&mut alice, "members-update").await;
    assert_eq!(presence["members"][0]["hasAudio"], true);
    assert_eq!(presence["members"][0]["hasVideo"], false);
}

#[tokio::test]
async fn test_join_for_other_room_is_a_protocol_violation() {
    let app = TestApp::with_rooms(&["lobby", "other"]);
    let addr = app.spawn().await;
    let (mut ws, _) = tokio_tungstenite::connect_async(ws_url(addr, &token_for("alice"), "lobby"))
        .await
        .unwrap();

    send_json(&mut ws, json!({"type": "join-room", "roomId": "other"})).await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["type"], "error");
    assert_eq!(event["code"], "protocol-violation");
    assert!(app
        .state
        .rooms
        .session(&RoomId::parse("other").unwrap())
        .is_none());

    // The connection survives and can still join its own room.
    send_json(&mut ws, json!({"type": "join-room", "roomId": "lobby"})).await;
    let [info, _, _] = join_events(&mut ws).await;
    assert_eq!(info["roomId"], "lobby");
}

#[tokio::test]
async fn test_second_join_is_a_protocol_violation() {
    let app = TestApp::with_rooms(&["lobby"]);
    let addr = app.spawn().await;
    let mut ws = connect_and_join(addr, "alice", "lobby").await;
    join_events(&mut ws).await;

    send_json(&mut ws, json!({"type": "join-room", "roomId": "lobby"})).await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["type"], "error");
    assert_eq!(event["code"], "protocol-violation");
    let live = app
        .state
        .rooms
        .live_snapshot(&RoomId::parse("lobby").unwrap())
        .unwrap();
    assert_eq!(live.members.len(), 1);
}

#[tokio::test]
async fn test_full_outbound_queue_drops_connection_and_room_continues() {
    let app = TestApp::configured(&["lobby"], |s| s.websocket.outbound_queue_capacity = 8);
    let addr = app.spawn().await;
    let mut alice = connect_and_join(addr, "alice", "lobby").await;
    join_events(&mut alice).await;
    let mut bob = connect_and_join(addr, "bob", "lobby").await;
    let [bob_info, _, _] = join_events(&mut bob).await;
    next_event_of(&mut alice, "members-update").await;
    let bob_id: ConnectionId = serde_json::from_value(bob_info["selfId"].clone()).unwrap();

    // No await in the loop, so bob's writer task cannot drain in between.
    let mut overflowed = false;
    for _ in 0..=8 {
        let frame = OutboundFrame::unsequenced(RoomEvent::error("filler", "filler"));
        if let Err(e) = app.state.gateway.deliver(&bob_id, frame) {
            assert_eq!(e, DeliveryError::QueueFull(bob_id));
            overflowed = true;
            break;
        }
    }
    assert!(overflowed);

    let presence = next_event_of(&mut alice, "members-update").await;
    let members = presence["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["username"], "alice");
    expect_closed(&mut bob).await;
    assert!(app.state.gateway.get(&bob_id).is_none());

    send_json(&mut alice, json!({"type": "send-message", "message": "still syncing"})).await;
    let chat = next_event_of(&mut alice, "chat-message").await;
    assert_eq!(chat["text"], "still syncing");
}

#[tokio::test]
async fn test_silent_connection_is_dropped_after_two_heartbeats() {
    let app = TestApp::configured(&["lobby"], |s| s.websocket.heartbeat_interval_ms = 100);
    let addr = app.spawn().await;
    let mut ws = connect_and_join(addr, "alice", "lobby").await;
    let room_id = RoomId::parse("lobby").unwrap();
    assert!(wait_until(|| !app.state.rooms.is_empty(&room_id)).await);

    // Not reading the socket also means no pong is sent back.
    let gateway = app.state.gateway.clone();
    assert!(wait_until(|| gateway.connection_count() == 0).await);

    assert!(app.state.rooms.is_empty(&room_id));
    expect_closed(&mut ws).await;
}
