//! Chat domain module.
//!
//! # Module Structure
//!
//! - `turn`: Transcript entries (`Turn`, `TurnRole`) and the append-only `Transcript`
//! - `status`: Session state machine states (`SessionStatus`)
//! - `error`: Chat-facing error taxonomy (`ChatError`)
//! - `backend`: Inference backend contract (`InferenceBackend`, `AskRequest`, `ResetRequest`)

mod backend;
mod error;
mod status;
mod turn;

pub use backend::{AskRequest, InferenceBackend, ResetRequest};
pub use error::ChatError;
pub use status::SessionStatus;
pub use turn::{PLACEHOLDER_REPLY, Transcript, Turn, TurnRole};
