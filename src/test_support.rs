//! Fixtures shared by unit tests.

use chrono::Utc;
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::domain::{ConnectionId, MediaType, OutboundFrame, Room, RoomId, UserIdentity};
use crate::presentation::websocket::Gateway;

pub const TEST_SECRET: &str = "test-secret-key-that-is-long-enough-32";

pub fn settings_fixture() -> Settings {
    Settings::with_secret(TEST_SECRET).unwrap()
}

pub fn room_fixture(id: &str) -> Room {
    Room {
        room_id: RoomId::parse(id).unwrap(),
        name: format!("Room {id}"),
        media_type: MediaType::Youtube,
        media_ref: Some("dQw4w9WgXcQ".into()),
        created_by: Some("owner".into()),
        created_at: Utc::now(),
    }
}

/// Register a connection for `username` and hand back its outbound queue.
pub fn join_connection(
    gateway: &Gateway,
    username: &str,
) -> (ConnectionId, mpsc::Receiver<OutboundFrame>) {
    let (session, rx) = gateway.accept(UserIdentity {
        user_id: format!("user-{username}"),
        username: username.to_string(),
    });
    (session.connection_id, rx)
}

/// Everything queued so far, without waiting.
pub fn drain(rx: &mut mpsc::Receiver<OutboundFrame>) -> Vec<OutboundFrame> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}
