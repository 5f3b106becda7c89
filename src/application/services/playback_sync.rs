//! Playback Synchronizer
//!
//! Last-writer-wins: whichever member's report is processed last becomes the
//! room's truth and is pushed to everyone else as `video-sync`. Two members
//! seeking at nearly the same moment can make the room flip between their
//! positions; that is accepted behavior, bounded by client-side seek
//! debouncing (~200ms).
//!
//! Required receiver behavior: only force-seek when
//! `|local - currentTime| > DRIFT_TOLERANCE_SECONDS`, and mirror `isPlaying`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use super::room_session::RoomSessionManager;
use crate::domain::{ConnectionId, PlaybackState, RoomEvent, RoomId};
use crate::shared::error::SyncError;

/// What a sync report did to the room.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastDecision {
    /// State after the report was applied
    pub state: PlaybackState,
    /// Members the `video-sync` was queued for (reporter excluded)
    pub recipients: usize,
}

#[derive(Debug, Clone)]
pub struct PlaybackSynchronizer {
    rooms: Arc<RoomSessionManager>,
}

impl PlaybackSynchronizer {
    pub fn new(rooms: Arc<RoomSessionManager>) -> Self {
        Self { rooms }
    }

    /// Apply a member's `(position, isPlaying)` report and fan it out.
    ///
    /// Reports are applied in arrival order under the room's exclusive
    /// section; no rate limiting happens here.
    #[instrument(skip_all, fields(room_id = %room_id, connection_id = %connection))]
    pub fn apply_sync(
        &self,
        room_id: &RoomId,
        connection: ConnectionId,
        reported_position: f64,
        reported_is_playing: bool,
    ) -> Result<BroadcastDecision, SyncError> {
        let session = self.rooms.session(room_id).ok_or_else(|| {
            SyncError::ProtocolViolation(format!("no playback state for room {room_id}"))
        })?;
        let mut state = session.exclusive().ok_or_else(|| {
            SyncError::ProtocolViolation(format!("room {room_id} was torn down"))
        })?;
        if !state.is_member(&connection) {
            return Err(SyncError::ProtocolViolation(
                "sync from a connection outside the room".into(),
            ));
        }

        state
            .playback_mut()
            .apply(reported_position, reported_is_playing, connection, Utc::now())
            .map_err(|e| SyncError::ProtocolViolation(e.to_string()))?;

        let playback = state.playback().clone();
        let recipients = state.broadcast(
            self.rooms.hub(),
            RoomEvent::video_sync(&playback),
            Some(&connection),
        );

        debug!(
            position = playback.position_seconds,
            is_playing = playback.is_playing,
            recipients,
            "Playback state updated"
        );
        Ok(BroadcastDecision {
            state: playback,
            recipients,
        })
    }
}
