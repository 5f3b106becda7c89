//! Authoritative playback state of a room.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_objects::ConnectionId;

/// Receivers only force-seek when their local position differs from a
/// broadcast position by more than this many seconds.
pub const DRIFT_TOLERANCE_SECONDS: f64 = 0.5;

/// Position / play-pause truth for a room's shared video.
///
/// Invariants: `position_seconds` is finite and `>= 0`, and
/// `last_updated_at` never moves backwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    #[serde(rename = "currentTime")]
    pub position_seconds: f64,
    pub is_playing: bool,
    #[serde(rename = "updatedAt")]
    pub last_updated_at: DateTime<Utc>,
    pub updated_by: Option<ConnectionId>,
}

/// Rejected playback report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("position {0} is not a finite number")]
    NonFinite(f64),

    #[error("position {0} is negative")]
    Negative(f64),
}

impl PlaybackState {
    /// Registry default for a fresh session: position 0, paused.
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            position_seconds: 0.0,
            is_playing: false,
            last_updated_at: now,
            updated_by: None,
        }
    }

    /// Replace the state with a member's report (last writer wins).
    pub fn apply(
        &mut self,
        position_seconds: f64,
        is_playing: bool,
        updated_by: ConnectionId,
        now: DateTime<Utc>,
    ) -> Result<(), PlaybackError> {
        if !position_seconds.is_finite() {
            return Err(PlaybackError::NonFinite(position_seconds));
        }
        if position_seconds < 0.0 {
            return Err(PlaybackError::Negative(position_seconds));
        }

        self.position_seconds = position_seconds;
        self.is_playing = is_playing;
        self.last_updated_at = now.max(self.last_updated_at);
        self.updated_by = Some(updated_by);
        Ok(())
    }

    /// Receiver-side drift rule: seek only beyond the tolerance.
    pub fn needs_seek(&self, local_position: f64) -> bool {
        (local_position - self.position_seconds).abs() > DRIFT_TOLERANCE_SECONDS
    }
}
