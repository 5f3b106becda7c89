//! Presentation Layer
//!
//! HTTP routes and WebSocket gateway handlers.

pub mod http;
pub mod middleware;
pub mod websocket;
