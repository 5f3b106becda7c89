//! Repository Implementations
//!
//! Implementations of the `RoomRegistry` collaborator trait defined in the
//! domain layer.
//!
//! ## Available Registries
//!
//! - **PgRoomRegistry** - PostgreSQL `rooms` table
//! - **InMemoryRoomRegistry** - Process-local map for development and tests
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crate::infrastructure::repositories::{InMemoryRoomRegistry, PgRoomRegistry};
//!
//! let registry: Arc<dyn RoomRegistry> = match pool {
//!     Some(pool) => Arc::new(PgRoomRegistry::new(pool)),
//!     None => Arc::new(InMemoryRoomRegistry::new()),
//! };
//! ```

pub mod memory_registry;
pub mod room_repository;

pub use memory_registry::InMemoryRoomRegistry;
pub use room_repository::PgRoomRegistry;
