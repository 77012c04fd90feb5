//! Character creation and update request model.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Character, DEFAULT_IMAGE};
use crate::record::generate_record_id;

/// Request to create or update a character.
///
/// Used by the creation form and the CLI alike. `id` is only honored for
/// updates; creation always derives a fresh id from the name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterRequest {
    /// Display name (required)
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub greeting: String,
    #[serde(default)]
    pub definition: String,
    /// Optional image reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,
}

impl CharacterRequest {
    /// Validate the request and return errors if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Character name is required and cannot be empty".to_string());
        }
        Ok(())
    }

    /// Convert this request into a new Character with a generated id.
    pub fn into_character(self) -> Character {
        let id = generate_record_id(&self.name, Utc::now());
        self.into_character_with_id(id)
    }

    /// Convert this request into a Character keeping the given id.
    pub fn into_character_with_id(self, id: String) -> Character {
        Character {
            id,
            name: self.name.trim().to_string(),
            tagline: self.tagline,
            description: self.description,
            greeting: self.greeting,
            definition: self.definition,
            img: self
                .img
                .filter(|img| !img.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            tags: self.tags,
            last_used: None,
        }
    }
}
