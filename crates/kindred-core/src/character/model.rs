//! Character domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Image reference used when a record has no picture of its own.
pub const DEFAULT_IMAGE: &str = "placeholder.png";

/// An authored character the user can chat with.
///
/// The `id` is assigned once at creation and never changes. A chat session
/// holds a snapshot of the character taken when the session became ready.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Character {
    /// Stable unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line pitch shown under the name
    #[serde(default)]
    pub tagline: String,
    /// Longer public description
    #[serde(default)]
    pub description: String,
    /// First assistant message of every fresh conversation
    #[serde(default)]
    pub greeting: String,
    /// Freeform behavioral prompt
    #[serde(default)]
    pub definition: String,
    /// Image reference (path under the assets directory)
    #[serde(default)]
    pub img: String,
    /// Tag groups (genre, rating, character, source, ...)
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,
    /// Last time a chat with this character became ready
    #[serde(default, alias = "lastUsed", skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl Character {
    /// Returns the text of the opening assistant turn.
    ///
    /// Falls back to a generated greeting naming the character when the
    /// authored greeting is blank.
    pub fn opening_line(&self) -> String {
        if self.greeting.trim().is_empty() {
            fallback_greeting(&self.name)
        } else {
            self.greeting.clone()
        }
    }
}

/// Greeting synthesized for characters without one.
pub fn fallback_greeting(name: &str) -> String {
    format!("Hi! I'm {}.", name)
}
