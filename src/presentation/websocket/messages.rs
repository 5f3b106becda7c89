//! WebSocket Message Types
//!
//! Client → server frames. Every frame is a JSON object with a kebab-case
//! `type` discriminator; server → client frames live in `domain::events`.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{ConnectionId, RoomId, SignalKind};

/// Frame types the gateway dispatches.
pub const CLIENT_FRAME_TYPES: &[&str] = &[
    "join-room",
    "sync-video",
    "send-message",
    "signal-offer",
    "signal-answer",
    "signal-candidate",
    "media-state",
    "leave",
];

/// Incoming client frame
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientFrame {
    JoinRoom {
        room_id: RoomId,
    },
    SyncVideo {
        current_time: f64,
        is_playing: bool,
    },
    SendMessage {
        message: String,
    },
    SignalOffer {
        to: ConnectionId,
        #[serde(default)]
        payload: Value,
    },
    SignalAnswer {
        to: ConnectionId,
        #[serde(default)]
        payload: Value,
    },
    SignalCandidate {
        to: ConnectionId,
        #[serde(default)]
        payload: Value,
    },
    MediaState {
        has_audio: bool,
        has_video: bool,
    },
    Leave,
}

/// Why an inbound text frame could not be turned into a `ClientFrame`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("unknown frame type `{0}`")]
    UnknownType(String),

    #[error("malformed frame: {0}")]
    Malformed(String),
}

impl ClientFrame {
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| FrameError::Malformed(e.to_string()))?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| FrameError::Malformed("missing `type`".into()))?;
        if !CLIENT_FRAME_TYPES.contains(&kind) {
            return Err(FrameError::UnknownType(kind.to_string()));
        }
        serde_json::from_value(value).map_err(|e| FrameError::Malformed(e.to_string()))
    }

    /// Wire name of the frame type
    pub fn frame_type(&self) -> &'static str {
        match self {
            ClientFrame::JoinRoom { .. } => "join-room",
            ClientFrame::SyncVideo { .. } => "sync-video",
            ClientFrame::SendMessage { .. } => "send-message",
            ClientFrame::SignalOffer { .. } => "signal-offer",
            ClientFrame::SignalAnswer { .. } => "signal-answer",
            ClientFrame::SignalCandidate { .. } => "signal-candidate",
            ClientFrame::MediaState { .. } => "media-state",
            ClientFrame::Leave => "leave",
        }
    }

    /// Split a signaling frame into its kind, target and opaque payload.
    pub fn into_signal(self) -> Option<(SignalKind, ConnectionId, Value)> {
        match self {
            ClientFrame::SignalOffer { to, payload } => Some((SignalKind::Offer, to, payload)),
            ClientFrame::SignalAnswer { to, payload } => Some((SignalKind::Answer, to, payload)),
            ClientFrame::SignalCandidate { to, payload } => {
                Some((SignalKind::Candidate, to, payload))
            }
            _ => None,
        }
    }
}
