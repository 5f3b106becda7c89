//! # Watch Party Server Library
//!
//! Real-time synchronization engine for shared viewing rooms:
//! - WebSocket gateway with bearer-token authentication
//! - Room sessions with host election and grace-period teardown
//! - Last-writer-wins playback sync
//! - Point-to-point WebRTC signaling relay
//! - Chat and presence broadcast
//! - A small REST API over the room registry
//!
//! ## Architecture
//!
//! - **Domain Layer**: Room, playback and member types; collaborator traits
//! - **Application Layer**: Live room services and DTOs
//! - **Infrastructure Layer**: Room registries, database, metrics
//! - **Presentation Layer**: HTTP handlers and WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! watch_party_server/
//! +-- config/         Configuration management
//! +-- domain/         Entities, identifiers, events
//! +-- application/    Room services and DTOs
//! +-- infrastructure/ Registries, database, metrics
//! +-- presentation/   HTTP routes and WebSocket gateway
//! +-- shared/         Error types
//! ```

// Configuration module
pub mod config;

// Domain layer
pub mod domain;

// Application layer - live room services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;

#[cfg(test)]
mod test_support;
