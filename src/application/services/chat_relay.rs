//! Presence & Chat Relay
//!
//! Chat lines are stamped with a server id and timestamp and fanned out to
//! every member, sender included. Presence is always a full snapshot.

use std::sync::Arc;

use tracing::{debug, instrument};

use super::room_session::RoomSessionManager;
use crate::domain::{ChatMessage, ConnectionId, RoomEvent, RoomId};
use crate::shared::error::SyncError;

#[derive(Debug, Clone)]
pub struct ChatRelay {
    rooms: Arc<RoomSessionManager>,
    max_chat_length: usize,
}

impl ChatRelay {
    pub fn new(rooms: Arc<RoomSessionManager>, max_chat_length: usize) -> Self {
        Self {
            rooms,
            max_chat_length,
        }
    }

    /// Stamp and broadcast a chat line from `from` to its whole room.
    #[instrument(skip_all, fields(room_id = %room_id, connection_id = %from))]
    pub fn broadcast_chat(
        &self,
        room_id: &RoomId,
        from: ConnectionId,
        text: &str,
    ) -> Result<ChatMessage, SyncError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SyncError::ProtocolViolation("empty chat message".into()));
        }
        if text.chars().count() > self.max_chat_length {
            return Err(SyncError::ProtocolViolation(format!(
                "chat message longer than {} characters",
                self.max_chat_length
            )));
        }

        let session = self.rooms.session(room_id).ok_or_else(|| {
            SyncError::ProtocolViolation(format!("room {room_id} has no live session"))
        })?;
        let mut state = session.exclusive().ok_or_else(|| {
            SyncError::ProtocolViolation(format!("room {room_id} was torn down"))
        })?;
        if !state.is_member(&from) {
            return Err(SyncError::ProtocolViolation(
                "chat from a connection outside the room".into(),
            ));
        }
        let sender = self
            .rooms
            .hub()
            .profile(&from)
            .ok_or_else(|| SyncError::TransportFailure(format!("sender {from} is gone")))?;

        // Stamped inside the exclusive section so ids and timestamps follow
        // broadcast order.
        let message = ChatMessage::stamp(sender.username, text);
        let recipients = state.broadcast(self.rooms.hub(), RoomEvent::chat(message.clone()), None);

        debug!(message_id = %message.id, recipients, "Chat message relayed");
        Ok(message)
    }

    /// Send the room's full membership snapshot to every member.
    #[instrument(skip_all, fields(room_id = %room_id))]
    pub fn broadcast_presence(&self, room_id: &RoomId) -> Result<usize, SyncError> {
        let session = self.rooms.session(room_id).ok_or_else(|| {
            SyncError::ProtocolViolation(format!("room {room_id} has no live session"))
        })?;
        let mut state = session.exclusive().ok_or_else(|| {
            SyncError::ProtocolViolation(format!("room {room_id} was torn down"))
        })?;
        Ok(state.broadcast_presence(self.rooms.hub()))
    }
}
