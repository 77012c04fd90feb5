//! Recent activity entries.
//!
//! The canonical wire schema is camelCase (`characterId`, `lastUsed`, ...).
//! Older collaborators emit snake_case names; both are accepted on read.

use serde::{Deserialize, Serialize};

/// Composite identity of a recent entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentKey {
    #[serde(alias = "character_id")]
    pub character_id: String,
    #[serde(alias = "persona_id")]
    pub persona_id: String,
}

impl RecentKey {
    pub fn new(character_id: impl Into<String>, persona_id: impl Into<String>) -> Self {
        Self {
            character_id: character_id.into(),
            persona_id: persona_id.into(),
        }
    }
}

/// A recently used pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    #[serde(alias = "character_id")]
    pub character_id: String,
    #[serde(alias = "persona_id")]
    pub persona_id: String,
    /// Character display name
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    /// Epoch seconds
    #[serde(alias = "last_used")]
    pub last_used: i64,
    #[serde(default, alias = "last_message", skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

impl RecentEntry {
    pub fn key(&self) -> RecentKey {
        RecentKey::new(self.character_id.clone(), self.persona_id.clone())
    }

    pub fn matches(&self, character_id: &str, persona_id: &str) -> bool {
        self.character_id == character_id && self.persona_id == persona_id
    }
}
