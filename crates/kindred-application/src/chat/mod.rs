//! Chat session orchestration.

mod orchestrator;
mod session;

pub use orchestrator::{ChatOrchestrator, ResetOutcome, SendOutcome};
pub use session::SessionSnapshot;
