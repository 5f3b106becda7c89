//! Room metadata entity and the Room Registry contract.
//!
//! The registry is a plain keyed store mapping a room id to its static
//! media reference. The real-time engine only ever reads from it on join.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::RoomId;

/// Kind of media a room plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Uploaded file served by the static host
    #[default]
    Upload,
    /// YouTube video id or URL
    Youtube,
    /// External stream URL
    Stream,
}

impl MediaType {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "youtube" => Self::Youtube,
            "stream" => Self::Stream,
            _ => Self::Upload,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Youtube => "youtube",
            Self::Stream => "stream",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static metadata of a room as stored in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: RoomId,
    pub name: String,
    pub media_type: MediaType,
    /// URL or id of the media; `None` until a file is attached
    pub media_ref: Option<String>,
    /// User id of the creator
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data needed to register a new room.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    pub room_id: RoomId,
    pub name: String,
    pub media_type: MediaType,
    pub media_ref: Option<String>,
    pub created_by: Option<String>,
}

impl NewRoom {
    pub fn into_room(self, created_at: DateTime<Utc>) -> Room {
        Room {
            room_id: self.room_id,
            name: self.name,
            media_type: self.media_type,
            media_ref: self.media_ref,
            created_by: self.created_by,
            created_at,
        }
    }
}

/// Registry failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("room {0} not found")]
    NotFound(String),

    #[error("room {0} already exists")]
    Conflict(String),

    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Room Registry collaborator.
///
/// Implementations are remote and fallible; callers wrap every call
/// in their own timeout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// Look up static room metadata.
    async fn lookup(&self, room_id: &RoomId) -> Result<Room, RegistryError>;

    /// Register a new room.
    async fn create(&self, room: NewRoom) -> Result<Room, RegistryError>;

    /// Cheap connectivity check for readiness probes.
    async fn health_check(&self) -> Result<(), RegistryError>;
}
