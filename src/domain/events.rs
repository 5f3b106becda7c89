//! Server → client events.
//!
//! Every variant serializes to a flat JSON object with a kebab-case
//! `type` discriminator, e.g. `{"type":"video-sync","currentTime":12.0,...}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::entities::{
    ChatMessage, MediaType, MemberProfile, MemberRole, PlaybackState, Room,
};
use super::value_objects::{ConnectionId, RoomId};

/// Peer-connection negotiation step. The relay never looks past this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

/// Opaque negotiation payload addressed from one member to another.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalingEnvelope {
    pub from: ConnectionId,
    pub to: ConnectionId,
    pub kind: SignalKind,
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum RoomEvent {
    RoomInfo {
        room_id: RoomId,
        name: String,
        media_type: MediaType,
        media_ref: Option<String>,
        role: MemberRole,
        self_id: ConnectionId,
    },
    VideoSync {
        current_time: f64,
        is_playing: bool,
        updated_at: DateTime<Utc>,
        updated_by: Option<ConnectionId>,
    },
    ChatMessage {
        id: Uuid,
        username: String,
        text: String,
        timestamp: DateTime<Utc>,
    },
    MembersUpdate {
        members: Vec<MemberProfile>,
    },
    SignalOffer {
        from: ConnectionId,
        payload: Value,
    },
    SignalAnswer {
        from: ConnectionId,
        payload: Value,
    },
    SignalCandidate {
        from: ConnectionId,
        payload: Value,
    },
    Error {
        code: String,
        message: String,
    },
}

impl RoomEvent {
    pub fn room_info(room: &Room, role: MemberRole, self_id: ConnectionId) -> Self {
        RoomEvent::RoomInfo {
            room_id: room.room_id.clone(),
            name: room.name.clone(),
            media_type: room.media_type,
            media_ref: room.media_ref.clone(),
            role,
            self_id,
        }
    }

    pub fn video_sync(state: &PlaybackState) -> Self {
        RoomEvent::VideoSync {
            current_time: state.position_seconds,
            is_playing: state.is_playing,
            updated_at: state.last_updated_at,
            updated_by: state.updated_by,
        }
    }

    pub fn chat(message: ChatMessage) -> Self {
        RoomEvent::ChatMessage {
            id: message.id,
            username: message.username,
            text: message.text,
            timestamp: message.timestamp,
        }
    }

    /// Forwarded form of an envelope, as seen by its target.
    pub fn signal(envelope: SignalingEnvelope) -> Self {
        let SignalingEnvelope {
            from, kind, payload, ..
        } = envelope;
        match kind {
            SignalKind::Offer => RoomEvent::SignalOffer { from, payload },
            SignalKind::Answer => RoomEvent::SignalAnswer { from, payload },
            SignalKind::Candidate => RoomEvent::SignalCandidate { from, payload },
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        RoomEvent::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Event name, used as a metrics and log label.
    pub fn event_name(&self) -> &'static str {
        match self {
            RoomEvent::RoomInfo { .. } => "room-info",
            RoomEvent::VideoSync { .. } => "video-sync",
            RoomEvent::ChatMessage { .. } => "chat-message",
            RoomEvent::MembersUpdate { .. } => "members-update",
            RoomEvent::SignalOffer { .. } => "signal-offer",
            RoomEvent::SignalAnswer { .. } => "signal-answer",
            RoomEvent::SignalCandidate { .. } => "signal-candidate",
            RoomEvent::Error { .. } => "error",
        }
    }
}

/// Event plus the room's sequence number at the time it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundFrame {
    #[serde(flatten)]
    pub event: RoomEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

impl OutboundFrame {
    pub fn sequenced(event: RoomEvent, seq: u64) -> Self {
        Self {
            event,
            seq: Some(seq),
        }
    }

    /// Frame produced outside any room session (handshake/join errors).
    pub fn unsequenced(event: RoomEvent) -> Self {
        Self { event, seq: None }
    }
}
