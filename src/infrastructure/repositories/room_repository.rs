//! Room Registry Implementation
//!
//! PostgreSQL implementation of the RoomRegistry trait over the `rooms`
//! table. Maps between the database schema and the domain Room entity.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{MediaType, NewRoom, RegistryError, Room, RoomId, RoomRegistry};
use crate::infrastructure::metrics;

/// Database row representation matching the rooms table schema.
#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    room_id: String,
    name: String,
    media_type: String,
    media_ref: Option<String>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl RoomRow {
    fn into_room(self) -> Result<Room, RegistryError> {
        let room_id = RoomId::parse(self.room_id)
            .map_err(|e| RegistryError::Unavailable(format!("corrupt rooms row: {e}")))?;
        Ok(Room {
            room_id,
            name: self.name,
            media_type: MediaType::from_str(&self.media_type),
            media_ref: self.media_ref,
            created_by: self.created_by,
            created_at: self.created_at,
        })
    }
}

fn unavailable(e: sqlx::Error) -> RegistryError {
    RegistryError::Unavailable(e.to_string())
}

/// PostgreSQL room registry.
#[derive(Clone)]
pub struct PgRoomRegistry {
    pool: PgPool,
}

impl PgRoomRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRegistry for PgRoomRegistry {
    async fn lookup(&self, room_id: &RoomId) -> Result<Room, RegistryError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT room_id, name, media_type, media_ref, created_by, created_at
            FROM rooms
            WHERE room_id = $1
            "#,
        )
        .bind(room_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        metrics::record_registry_call("lookup", started.elapsed().as_secs_f64());

        row.ok_or_else(|| RegistryError::NotFound(room_id.to_string()))?
            .into_room()
    }

    async fn create(&self, room: NewRoom) -> Result<Room, RegistryError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            INSERT INTO rooms (room_id, name, media_type, media_ref, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING room_id, name, media_type, media_ref, created_by, created_at
            "#,
        )
        .bind(room.room_id.as_str())
        .bind(&room.name)
        .bind(room.media_type.as_str())
        .bind(&room.media_ref)
        .bind(&room.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return RegistryError::Conflict(room.room_id.to_string());
                }
            }
            unavailable(e)
        })?;
        metrics::record_registry_call("create", started.elapsed().as_secs_f64());

        row.into_room()
    }

    async fn health_check(&self) -> Result<(), RegistryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(unavailable)
    }
}
