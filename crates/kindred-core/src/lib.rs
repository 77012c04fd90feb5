//! Domain layer for Kindred.
//!
//! Models for characters, personas, chat transcripts and recent activity,
//! plus the traits the application layer uses to reach its collaborators
//! (record store, inference backend, recent sources, service launcher).

pub mod character;
pub mod chat;
pub mod error;
pub mod persona;
pub mod recent;
pub mod record;
pub mod service;

// Re-export common error type
pub use error::{KindredError, Result};
