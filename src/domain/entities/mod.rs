//! # Domain Entities
//!
//! - **Room**: static room metadata and the `RoomRegistry` collaborator trait
//! - **PlaybackState**: authoritative position / play-pause of a room
//! - **Member**: user identity, media capabilities, presence entries
//! - **ChatMessage**: ephemeral relayed chat line

mod chat;
mod member;
mod playback;
mod room;

pub use chat::ChatMessage;
pub use member::{MediaCapabilities, MemberProfile, MemberRole, UserIdentity};
pub use playback::{PlaybackError, PlaybackState, DRIFT_TOLERANCE_SECONDS};
pub use room::{MediaType, NewRoom, RegistryError, Room, RoomRegistry};

#[cfg(test)]
pub use room::MockRoomRegistry;
