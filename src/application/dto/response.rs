//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;

use crate::application::services::LiveSnapshot;
use crate::domain::{MemberProfile, PlaybackState, Room};

/// Room response: registry metadata plus live state when a session exists
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    #[serde(flatten)]
    pub room: Room,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<LiveRoomResponse>,
}

/// Live session state of a room
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveRoomResponse {
    pub members: Vec<MemberProfile>,
    pub playback: PlaybackState,
}

impl From<LiveSnapshot> for LiveRoomResponse {
    fn from(snapshot: LiveSnapshot) -> Self {
        Self {
            members: snapshot.members,
            playback: snapshot.playback,
        }
    }
}

impl RoomResponse {
    pub fn new(room: Room, live: Option<LiveSnapshot>) -> Self {
        Self {
            room,
            live: live.map(LiveRoomResponse::from),
        }
    }
}
