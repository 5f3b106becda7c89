//! Application Services
//!
//! Coordinate live room state on top of the domain types.
//!
//! ## Available Services
//!
//! - **RoomSessionManager**: Room lifecycle, membership, grace-period teardown
//! - **PlaybackSynchronizer**: Last-writer-wins playback state
//! - **SignalingRelay**: Point-to-point WebRTC offer/answer/candidate relay
//! - **ChatRelay**: Chat and presence broadcast
//! - **TokenVerifier**: Bearer token verification

pub mod auth_service;
pub mod chat_relay;
pub mod playback_sync;
pub mod room_session;
pub mod signaling;

pub use auth_service::{
    issue_token, verify_within, AuthError, Claims, JwtTokenVerifier, TokenVerifier,
};
pub use chat_relay::ChatRelay;
pub use playback_sync::{BroadcastDecision, PlaybackSynchronizer};
pub use room_session::{JoinOutcome, LiveSnapshot, RoomSession, RoomSessionManager, SessionState};
pub use signaling::SignalingRelay;

#[cfg(test)]
pub use auth_service::MockTokenVerifier;
