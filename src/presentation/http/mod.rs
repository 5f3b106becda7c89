//! HTTP API
//!
//! Health probes, metrics, and the room-management API.

pub mod handlers;
pub mod routes;
