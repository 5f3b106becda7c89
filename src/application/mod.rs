//! Application Layer
//!
//! Contains the room services that own live state and the data transfer
//! objects (DTOs) of the HTTP API. This layer sits between the
//! presentation and domain layers.

pub mod dto;
pub mod services;
