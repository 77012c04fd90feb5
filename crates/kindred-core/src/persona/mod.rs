//! Persona domain module.
//!
//! A persona is the user's self-description used to contextualize the
//! character's replies.

mod model;
pub mod request;

pub use model::Persona;
pub use request::PersonaRequest;
