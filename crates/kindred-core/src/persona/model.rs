//! Persona domain model.

use serde::{Deserialize, Serialize};

/// The user's side of a conversation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Stable unique identifier
    pub id: String,
    /// Name the character addresses the user by
    #[serde(alias = "name")]
    pub display_name: String,
    /// Who the user is in the story
    #[serde(default)]
    pub background: String,
    /// Image reference (path under the assets directory)
    #[serde(default)]
    pub img: String,
}
