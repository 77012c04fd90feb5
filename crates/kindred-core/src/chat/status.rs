//! Session state machine states.

use serde::{Deserialize, Serialize};

/// Status of a chat session, bound by the UI.
///
/// ```text
/// Uninitialized -> Bootstrapping -> Loading -> Ready <-> Sending
///                        |             |
///                        +--> Error <--+   (retry re-enters Bootstrapping)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Uninitialized,
    Bootstrapping,
    Loading,
    Ready,
    Sending,
    Error,
}

impl SessionStatus {
    /// Still bringing the session up.
    pub fn is_initializing(&self) -> bool {
        matches!(self, SessionStatus::Bootstrapping | SessionStatus::Loading)
    }
}
