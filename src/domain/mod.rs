//! # Domain Layer
//!
//! Core types of the watch-party engine, independent of transport and storage.
//!
//! ## Structure
//!
//! - **entities**: Room metadata, PlaybackState, members, chat messages
//! - **value_objects**: Connection and room identifiers
//! - **events**: Server → client events and their sequenced frames
//! - **delivery**: The `ConnectionHub` contract sessions use to reach members
//!
//! Collaborator traits (`RoomRegistry`) live next to the entities they
//! serve and are implemented in the infrastructure layer.

pub mod delivery;
pub mod entities;
pub mod events;
pub mod value_objects;

// Re-export commonly used types
pub use delivery::{ConnectionHub, DeliveryError};
pub use entities::*;
pub use events::{OutboundFrame, RoomEvent, SignalKind, SignalingEnvelope};
pub use value_objects::*;
