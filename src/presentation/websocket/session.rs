//! WebSocket Session Management

use std::time::Duration;

use tokio::time::Instant;

use crate::domain::{ConnectionId, RoomId};

/// Per-connection state owned by the connection's inbound task
#[derive(Debug)]
pub struct ConnectionState {
    pub connection_id: ConnectionId,
    /// Room named in the upgrade request; `join-room` must match it
    pub handshake_room: RoomId,
    joined: Option<RoomId>,
    last_seen: Instant,
}

impl ConnectionState {
    pub fn new(connection_id: ConnectionId, handshake_room: RoomId) -> Self {
        Self {
            connection_id,
            handshake_room,
            joined: None,
            last_seen: Instant::now(),
        }
    }

    /// Any inbound traffic counts as a heartbeat.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn is_alive(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() < timeout
    }

    pub fn joined_room(&self) -> Option<&RoomId> {
        self.joined.as_ref()
    }

    /// Record the room association. It can only be set once.
    pub fn mark_joined(&mut self, room_id: RoomId) -> bool {
        if self.joined.is_some() {
            return false;
        }
        self.joined = Some(room_id);
        true
    }
}
