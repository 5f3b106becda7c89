//! WebSocket Gateway
//!
//! Real-time communication via WebSocket connections.

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod session;

pub use gateway::{ConnectedSession, Gateway};
pub use handler::ws_handler;
pub use messages::{ClientFrame, FrameError};
pub use session::ConnectionState;
