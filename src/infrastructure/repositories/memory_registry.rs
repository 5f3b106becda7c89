//! In-memory Room Registry, used when no database is configured and in tests.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};

use crate::domain::{NewRoom, RegistryError, Room, RoomId, RoomRegistry};

#[derive(Debug, Default)]
pub struct InMemoryRoomRegistry {
    rooms: DashMap<RoomId, Room>,
}

impl InMemoryRoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `rooms`.
    pub fn with_rooms(rooms: impl IntoIterator<Item = Room>) -> Self {
        let registry = Self::new();
        for room in rooms {
            registry.rooms.insert(room.room_id.clone(), room);
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn lookup(&self, room_id: &RoomId) -> Result<Room, RegistryError> {
        self.rooms
            .get(room_id)
            .map(|room| room.value().clone())
            .ok_or_else(|| RegistryError::NotFound(room_id.to_string()))
    }

    async fn create(&self, room: NewRoom) -> Result<Room, RegistryError> {
        match self.rooms.entry(room.room_id.clone()) {
            Entry::Occupied(_) => Err(RegistryError::Conflict(room.room_id.to_string())),
            Entry::Vacant(slot) => {
                let room = room.into_room(Utc::now());
                slot.insert(room.clone());
                Ok(room)
            }
        }
    }

    async fn health_check(&self) -> Result<(), RegistryError> {
        Ok(())
    }
}
