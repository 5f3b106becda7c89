//! Integration Tests Entry Point
//!
//! Tests are organized by module:
//! - `api/` - REST endpoints and the WebSocket gateway
//! - `common/` - Shared test utilities

mod api;
mod common;
