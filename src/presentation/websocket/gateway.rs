//! WebSocket Gateway
//!
//! Registry of live connections and their bounded outbound queues. Room
//! sessions reach members only through the `ConnectionHub` impl below.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};

use crate::domain::{
    ConnectionHub, ConnectionId, DeliveryError, MediaCapabilities, MemberProfile, OutboundFrame,
    RoomId, UserIdentity,
};
use crate::infrastructure::metrics;

/// Connected session with its outbound queue
#[derive(Debug)]
pub struct ConnectedSession {
    pub connection_id: ConnectionId,
    pub user: UserIdentity,
    /// Set once on the first successful `join-room`; immutable afterwards
    pub room: OnceLock<RoomId>,
    capabilities: Mutex<MediaCapabilities>,
    sender: mpsc::Sender<OutboundFrame>,
    /// Signalled when the server wants this connection gone
    close: Arc<Notify>,
    pub connected_at: DateTime<Utc>,
}

impl ConnectedSession {
    pub fn capabilities(&self) -> MediaCapabilities {
        *self.capabilities.lock()
    }

    pub fn profile(&self) -> MemberProfile {
        MemberProfile::new(self.connection_id, self.user.username.clone(), self.capabilities())
    }

    /// Handle the connection task waits on to learn it must shut down.
    pub fn close_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.close)
    }

    /// Ask the connection task to shut down.
    pub fn close(&self) {
        self.close.notify_one();
    }
}

/// WebSocket gateway managing all connections
#[derive(Debug)]
pub struct Gateway {
    /// Active sessions by connection id
    sessions: DashMap<ConnectionId, Arc<ConnectedSession>>,
    queue_capacity: usize,
}

impl Gateway {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register an authenticated connection. The returned receiver feeds the
    /// connection's writer task.
    pub fn accept(
        &self,
        user: UserIdentity,
    ) -> (Arc<ConnectedSession>, mpsc::Receiver<OutboundFrame>) {
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        let session = Arc::new(ConnectedSession {
            connection_id: ConnectionId::new(),
            user,
            room: OnceLock::new(),
            capabilities: Mutex::new(MediaCapabilities::default()),
            sender,
            close: Arc::new(Notify::new()),
            connected_at: Utc::now(),
        });

        self.sessions
            .insert(session.connection_id, Arc::clone(&session));
        metrics::set_websocket_connections(self.sessions.len());

        tracing::info!(
            connection_id = %session.connection_id,
            user_id = %session.user.user_id,
            "Session registered"
        );
        (session, receiver)
    }

    /// Unregister a session
    pub fn unregister(&self, connection_id: &ConnectionId) -> Option<Arc<ConnectedSession>> {
        let removed = self.sessions.remove(connection_id).map(|(_, s)| s);
        if let Some(session) = &removed {
            metrics::set_websocket_connections(self.sessions.len());
            tracing::info!(
                connection_id = %connection_id,
                user_id = %session.user.user_id,
                "Session unregistered"
            );
        }
        removed
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<Arc<ConnectedSession>> {
        self.sessions.get(connection_id).map(|s| Arc::clone(s.value()))
    }

    /// Replace a connection's media capability flags. Returns `false` when
    /// the connection is unknown.
    pub fn set_capabilities(&self, connection_id: &ConnectionId, caps: MediaCapabilities) -> bool {
        match self.sessions.get(connection_id) {
            Some(session) => {
                *session.capabilities.lock() = caps;
                true
            }
            None => false,
        }
    }

    /// Get session count
    pub fn connection_count(&self) -> usize {
        self.sessions.len()
    }
}

impl ConnectionHub for Gateway {
    fn deliver(&self, to: &ConnectionId, frame: OutboundFrame) -> Result<(), DeliveryError> {
        let session = self
            .sessions
            .get(to)
            .map(|s| Arc::clone(s.value()))
            .ok_or(DeliveryError::UnknownConnection(*to))?;

        match session.sender.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(connection_id = %to, "Outbound queue full, dropping connection");
                metrics::record_dropped_connection("slow-consumer");
                session.close();
                Err(DeliveryError::QueueFull(*to))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(DeliveryError::Closed(*to)),
        }
    }

    fn profile(&self, id: &ConnectionId) -> Option<MemberProfile> {
        self.sessions.get(id).map(|s| s.profile())
    }
}
