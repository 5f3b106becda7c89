//! Outbound delivery contract between room sessions and live connections.
//!
//! Room sessions only hold connection ids. Anything they want to say to a
//! member goes through a `ConnectionHub`, which owns the transports.

use super::entities::MemberProfile;
use super::events::OutboundFrame;
use super::value_objects::ConnectionId;

/// Why a frame could not be queued for a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),

    #[error("outbound queue of connection {0} is full")]
    QueueFull(ConnectionId),

    #[error("connection {0} is closed")]
    Closed(ConnectionId),
}

pub trait ConnectionHub: Send + Sync {
    /// Queue a frame without blocking. Must never wait on the peer.
    fn deliver(&self, to: &ConnectionId, frame: OutboundFrame) -> Result<(), DeliveryError>;

    /// Presence entry for a live connection, `None` once it is gone.
    fn profile(&self, id: &ConnectionId) -> Option<MemberProfile>;
}
