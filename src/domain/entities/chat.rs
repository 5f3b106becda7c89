//! Ephemeral chat message. Never stored, only relayed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Server-assigned, time-ordered id
    pub id: Uuid,
    pub username: String,
    pub text: String,
    /// Server-assigned broadcast time
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Stamp a message with a server id and timestamp.
    pub fn stamp(username: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}
