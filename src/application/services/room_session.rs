//! Room Session Manager
//!
//! Owns the live `RoomSession` of every active room. Each session guards its
//! membership, PlaybackState and event sequence behind one exclusive section;
//! rooms never share a lock. All fan-out happens while that section is held,
//! so members observe a room's events in the order they were applied.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

use crate::config::RoomSettings;
use crate::domain::{
    ConnectionHub, ConnectionId, DeliveryError, MemberProfile, MemberRole, OutboundFrame,
    PlaybackState, RegistryError, Room, RoomEvent, RoomId, RoomRegistry,
};
use crate::infrastructure::metrics;
use crate::shared::error::SyncError;

/// Mutable state of one room. Only reachable through `RoomSession::exclusive`.
#[derive(Debug)]
pub struct SessionState {
    /// Join order; used for listing only
    members: Vec<ConnectionId>,
    playback: PlaybackState,
    sequence: u64,
    /// Bumped whenever the room empties or refills, invalidating stale teardowns
    teardown_generation: u64,
    closed: bool,
}

impl SessionState {
    fn new() -> Self {
        Self {
            members: Vec::new(),
            playback: PlaybackState::initial(Utc::now()),
            sequence: 0,
            teardown_generation: 0,
            closed: false,
        }
    }

    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    pub fn is_member(&self, connection: &ConnectionId) -> bool {
        self.members.contains(connection)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackState {
        &mut self.playback
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Returns `true` when the connection was not already a member.
    fn add_member(&mut self, connection: ConnectionId) -> bool {
        self.teardown_generation += 1;
        if self.is_member(&connection) {
            return false;
        }
        self.members.push(connection);
        true
    }

    fn remove_member(&mut self, connection: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != connection);
        before != self.members.len()
    }

    /// Queue `event` for one member under the next sequence number.
    pub fn send_to(
        &mut self,
        hub: &dyn ConnectionHub,
        to: &ConnectionId,
        event: RoomEvent,
    ) -> Result<(), DeliveryError> {
        let seq = self.next_sequence();
        let name = event.event_name();
        hub.deliver(to, OutboundFrame::sequenced(event, seq))
            .inspect_err(|e| debug!(connection_id = %to, event = name, error = %e, "Delivery failed"))
    }

    /// Queue `event` for every member except `excluding`. Returns the number
    /// of members the frame was queued for.
    pub fn broadcast(
        &mut self,
        hub: &dyn ConnectionHub,
        event: RoomEvent,
        excluding: Option<&ConnectionId>,
    ) -> usize {
        let seq = self.next_sequence();
        let name = event.event_name();
        let mut delivered = 0;
        for member in &self.members {
            if Some(member) == excluding {
                continue;
            }
            match hub.deliver(member, OutboundFrame::sequenced(event.clone(), seq)) {
                Ok(()) => delivered += 1,
                Err(e) => debug!(connection_id = %member, event = name, error = %e, "Delivery failed"),
            }
        }
        delivered
    }

    /// Full membership snapshot to every member. Connections that vanished
    /// from the hub are skipped rather than reported.
    pub fn broadcast_presence(&mut self, hub: &dyn ConnectionHub) -> usize {
        let members = self
            .members
            .iter()
            .filter_map(|id| hub.profile(id))
            .collect();
        self.broadcast(hub, RoomEvent::MembersUpdate { members }, None)
    }
}

/// Authoritative in-memory state of one active room.
#[derive(Debug)]
pub struct RoomSession {
    room_id: RoomId,
    state: Mutex<SessionState>,
}

impl RoomSession {
    fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            state: Mutex::new(SessionState::new()),
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Enter the room's exclusive section. `None` once the session was torn down.
    pub fn exclusive(&self) -> Option<MutexGuard<'_, SessionState>> {
        let state = self.state.lock();
        (!state.closed).then_some(state)
    }
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub role: MemberRole,
    pub playback: PlaybackState,
    pub room: Room,
}

/// Read-only view of a live session, for the HTTP API.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSnapshot {
    pub members: Vec<MemberProfile>,
    pub playback: PlaybackState,
}

/// Registry of live room sessions.
pub struct RoomSessionManager {
    sessions: DashMap<RoomId, Arc<RoomSession>>,
    registry: Arc<dyn RoomRegistry>,
    hub: Arc<dyn ConnectionHub>,
    grace_period: Duration,
    collaborator_timeout: Duration,
}

impl RoomSessionManager {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        hub: Arc<dyn ConnectionHub>,
        settings: &RoomSettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            sessions: DashMap::new(),
            registry,
            hub,
            grace_period: settings.grace_period(),
            collaborator_timeout: settings.collaborator_timeout(),
        })
    }

    pub fn hub(&self) -> &dyn ConnectionHub {
        self.hub.as_ref()
    }

    pub fn registry(&self) -> &Arc<dyn RoomRegistry> {
        &self.registry
    }

    /// Live session of a room, if any.
    pub fn session(&self, room_id: &RoomId) -> Option<Arc<RoomSession>> {
        self.sessions.get(room_id).map(|s| Arc::clone(s.value()))
    }

    /// Existing session or a fresh one seeded with the default PlaybackState.
    pub fn get_or_create(&self, room_id: &RoomId) -> Arc<RoomSession> {
        let mut created = false;
        let session = self
            .sessions
            .entry(room_id.clone())
            .or_insert_with(|| {
                created = true;
                Arc::new(RoomSession::new(room_id.clone()))
            })
            .clone();
        if created {
            metrics::set_room_sessions(self.sessions.len());
            info!(room_id = %room_id, "Room session created");
        }
        session
    }

    /// Number of live sessions, including ones inside their grace period.
    pub fn active_rooms(&self) -> usize {
        self.sessions.len()
    }

    /// Current members and PlaybackState of a live room.
    pub fn live_snapshot(&self, room_id: &RoomId) -> Option<LiveSnapshot> {
        let session = self.session(room_id)?;
        let state = session.exclusive()?;
        Some(LiveSnapshot {
            members: state
                .members()
                .iter()
                .filter_map(|id| self.hub.profile(id))
                .collect(),
            playback: state.playback().clone(),
        })
    }

    /// `true` when the room has no session or no members.
    pub fn is_empty(&self, room_id: &RoomId) -> bool {
        match self.session(room_id) {
            Some(session) => session.exclusive().map_or(true, |state| state.is_empty()),
            None => true,
        }
    }

    /// Add a connection to a room.
    ///
    /// The joiner receives `room-info` followed by a `video-sync` with the
    /// current PlaybackState; every member (joiner included) then receives
    /// a `members-update`. A registry failure leaves the session untouched.
    #[instrument(skip_all, fields(room_id = %room_id, connection_id = %connection))]
    pub async fn join(
        self: &Arc<Self>,
        room_id: &RoomId,
        connection: ConnectionId,
    ) -> Result<JoinOutcome, SyncError> {
        let room = match tokio::time::timeout(
            self.collaborator_timeout,
            self.registry.lookup(room_id),
        )
        .await
        {
            Ok(Ok(room)) => room,
            Ok(Err(RegistryError::NotFound(id))) => return Err(SyncError::RoomNotFound(id)),
            Ok(Err(e)) => return Err(SyncError::RegistryUnavailable(e.to_string())),
            Err(_) => {
                return Err(SyncError::RegistryUnavailable(
                    "room lookup timed out".into(),
                ))
            }
        };

        loop {
            let session = self.get_or_create(room_id);
            // A session closed between lookup and lock has already been
            // removed from the map; the next pass creates a fresh one.
            let Some(mut state) = session.exclusive() else {
                continue;
            };

            let role = if state.is_empty() {
                MemberRole::Host
            } else {
                MemberRole::Viewer
            };
            state.add_member(connection);

            let hub = self.hub.as_ref();
            state
                .send_to(hub, &connection, RoomEvent::room_info(&room, role, connection))
                .map_err(|e| SyncError::TransportFailure(e.to_string()))?;
            let playback = state.playback().clone();
            state
                .send_to(hub, &connection, RoomEvent::video_sync(&playback))
                .map_err(|e| SyncError::TransportFailure(e.to_string()))?;
            let notified = state.broadcast_presence(hub);

            info!(
                members = state.members().len(),
                notified,
                role = ?role,
                "Member joined room"
            );
            return Ok(JoinOutcome {
                role,
                playback,
                room,
            });
        }
    }

    /// Remove a connection from a room and tell the remaining members.
    ///
    /// An emptied room is kept for the grace period so a reconnecting
    /// member finds its PlaybackState intact.
    #[instrument(skip_all, fields(room_id = %room_id, connection_id = %connection))]
    pub fn leave(self: &Arc<Self>, room_id: &RoomId, connection: &ConnectionId) {
        let Some(session) = self.session(room_id) else {
            return;
        };
        let Some(mut state) = session.exclusive() else {
            return;
        };
        if !state.remove_member(connection) {
            return;
        }

        if state.is_empty() {
            state.teardown_generation += 1;
            let generation = state.teardown_generation;
            drop(state);
            info!(grace_secs = self.grace_period.as_secs(), "Room empty, teardown scheduled");
            self.schedule_teardown(session, generation);
        } else {
            let notified = state.broadcast_presence(self.hub.as_ref());
            info!(members = state.members().len(), notified, "Member left room");
        }
    }

    fn schedule_teardown(self: &Arc<Self>, session: Arc<RoomSession>, generation: u64) {
        let manager: Weak<Self> = Arc::downgrade(self);
        let grace_period = self.grace_period;
        tokio::spawn(async move {
            tokio::time::sleep(grace_period).await;
            if let Some(manager) = manager.upgrade() {
                manager.reap(&session, generation);
            }
        });
    }

    /// Destroy the session if it is still empty and nobody rejoined since
    /// the teardown was scheduled.
    fn reap(&self, session: &Arc<RoomSession>, generation: u64) {
        let mut state = session.state.lock();
        if state.closed || !state.is_empty() || state.teardown_generation != generation {
            debug!(room_id = %session.room_id, "Teardown skipped, room was rejoined");
            return;
        }
        state.closed = true;
        // Removed while still holding the session lock so a concurrent join
        // either sees the closed flag and retries, or misses the old entry.
        self.sessions
            .remove_if(&session.room_id, |_, live| Arc::ptr_eq(live, session));
        drop(state);

        metrics::set_room_sessions(self.sessions.len());
        info!(room_id = %session.room_id, "Room session torn down");
    }
}

impl std::fmt::Debug for RoomSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSessionManager")
            .field("sessions", &self.sessions.len())
            .field("grace_period", &self.grace_period)
            .finish()
    }
}
