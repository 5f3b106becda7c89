//! Room Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::{CreateRoomRequest, RoomResponse};
use crate::domain::{RegistryError, RoomId};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn registry_error(e: RegistryError) -> AppError {
    match e {
        RegistryError::NotFound(id) => AppError::NotFound(format!("Room {} not found", id)),
        RegistryError::Conflict(id) => AppError::Conflict(format!("Room {} already exists", id)),
        RegistryError::Unavailable(msg) => AppError::Unavailable(msg),
    }
}

/// Register a new room
pub async fn create_room(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), AppError> {
    // Validate request
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let new_room = body.into_new_room(&user.user_id)?;

    let room = tokio::time::timeout(
        state.settings.rooms.collaborator_timeout(),
        state.rooms.registry().create(new_room),
    )
    .await
    .map_err(|_| AppError::Unavailable("Room registry timed out".into()))?
    .map_err(registry_error)?;

    tracing::info!(room_id = %room.room_id, user_id = %user.user_id, "Room created");
    Ok((StatusCode::CREATED, Json(RoomResponse::new(room, None))))
}

/// Get a room with its live session state
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let room_id =
        RoomId::parse(room_id).map_err(|_| AppError::BadRequest("Invalid room ID".into()))?;

    let room = tokio::time::timeout(
        state.settings.rooms.collaborator_timeout(),
        state.rooms.registry().lookup(&room_id),
    )
    .await
    .map_err(|_| AppError::Unavailable("Room registry timed out".into()))?
    .map_err(registry_error)?;

    let live = state.rooms.live_snapshot(&room_id);
    Ok(Json(RoomResponse::new(room, live)))
}
