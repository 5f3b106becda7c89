//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use validator::Validate;

use crate::domain::{MediaType, NewRoom, RoomId};
use crate::shared::error::AppError;

/// Create room request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// Generated when absent
    #[validate(length(min = 1, max = 64, message = "Room id must be 1-64 characters"))]
    pub room_id: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(rename = "type", default)]
    pub media_type: MediaType,

    /// Media URL or provider id
    #[validate(length(min = 1, max = 2048, message = "URL must be at most 2048 characters"))]
    pub url: Option<String>,
}

impl CreateRoomRequest {
    /// Turn a validated request into a registry entry owned by `created_by`.
    pub fn into_new_room(self, created_by: &str) -> Result<NewRoom, AppError> {
        let room_id = match self.room_id {
            Some(raw) => RoomId::parse(raw).map_err(|e| AppError::Validation(e.to_string()))?,
            None => RoomId::generate(),
        };
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name must not be blank".into()));
        }
        if self.media_type != MediaType::Upload && self.url.is_none() {
            return Err(AppError::Validation(format!(
                "A {} room needs a url",
                self.media_type
            )));
        }

        Ok(NewRoom {
            room_id,
            name: name.to_string(),
            media_type: self.media_type,
            media_ref: self.url,
            created_by: Some(created_by.to_string()),
        })
    }
}
