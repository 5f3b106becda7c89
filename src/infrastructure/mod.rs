//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Room registries (PostgreSQL, in-memory)
//! - Database pool and migrations
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod repositories;
