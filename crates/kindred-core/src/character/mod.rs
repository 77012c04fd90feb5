//! Character domain module.
//!
//! A character is an authored AI persona definition that drives the
//! assistant's side of a conversation.
//!
//! # Module Structure
//!
//! - `model`: The `Character` record and greeting rules
//! - `request`: Creation/update request with validation

mod model;
pub mod request;

pub use model::{Character, DEFAULT_IMAGE, fallback_greeting};
pub use request::CharacterRequest;
