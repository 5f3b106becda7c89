//! Users, room members and their media capabilities.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ConnectionId;

/// Identity resolved by the Auth collaborator from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: String,
    pub username: String,
}

/// Audio/video capability flags of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCapabilities {
    pub has_audio: bool,
    pub has_video: bool,
}

/// One entry of a `members-update` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    /// Connection id, also the signaling address of this member
    pub id: ConnectionId,
    pub username: String,
    pub has_video: bool,
    pub has_audio: bool,
}

impl MemberProfile {
    pub fn new(id: ConnectionId, username: impl Into<String>, caps: MediaCapabilities) -> Self {
        Self {
            id,
            username: username.into(),
            has_video: caps.has_video,
            has_audio: caps.has_audio,
        }
    }
}

/// Role handed to a member on join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Joined a room without a live session and created it
    Host,
    /// Joined an already live session
    Viewer,
}
