//! Value Objects
//!
//! Immutable identifier types shared by every layer.

mod ids;

pub use ids::{ConnectionId, InvalidRoomId, RoomId, MAX_ROOM_ID_LENGTH};
