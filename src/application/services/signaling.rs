//! Signaling Relay
//!
//! Forwards offer / answer / candidate envelopes between two members of the
//! same room. Payloads are never inspected, buffered or retried; a target
//! that already left simply never hears about it.

use std::sync::Arc;

use tracing::{debug, instrument};

use super::room_session::RoomSessionManager;
use crate::domain::{RoomEvent, RoomId, SignalingEnvelope};
use crate::shared::error::SyncError;

#[derive(Debug, Clone)]
pub struct SignalingRelay {
    rooms: Arc<RoomSessionManager>,
}

impl SignalingRelay {
    pub fn new(rooms: Arc<RoomSessionManager>) -> Self {
        Self { rooms }
    }

    /// Forward `envelope` to its target if the target is still in `room_id`.
    ///
    /// Returns `PeerUnreachable` when the target is gone; callers drop that
    /// silently.
    #[instrument(skip_all, fields(room_id = %room_id, from = %envelope.from, to = %envelope.to, kind = ?envelope.kind))]
    pub fn relay(&self, room_id: &RoomId, envelope: SignalingEnvelope) -> Result<(), SyncError> {
        let session = self
            .rooms
            .session(room_id)
            .ok_or_else(|| SyncError::PeerUnreachable(format!("room {room_id} is not live")))?;
        let mut state = session
            .exclusive()
            .ok_or_else(|| SyncError::PeerUnreachable(format!("room {room_id} was torn down")))?;

        if !state.is_member(&envelope.from) {
            return Err(SyncError::ProtocolViolation(
                "signal from a connection outside the room".into(),
            ));
        }
        if envelope.to == envelope.from || !state.is_member(&envelope.to) {
            return Err(SyncError::PeerUnreachable(envelope.to.to_string()));
        }

        let to = envelope.to;
        state
            .send_to(self.rooms.hub(), &to, RoomEvent::signal(envelope))
            .map_err(|e| SyncError::PeerUnreachable(e.to_string()))?;
        debug!("Signal forwarded");
        Ok(())
    }
}
