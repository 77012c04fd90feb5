//! Persona creation and update request model.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::Persona;
use crate::character::DEFAULT_IMAGE;
use crate::record::generate_record_id;

/// Request to create or update a persona.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaRequest {
    /// Display name (required)
    pub display_name: String,
    #[serde(default)]
    pub background: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

impl PersonaRequest {
    /// Validate the request and return errors if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.display_name.trim().is_empty() {
            return Err("Persona name is required and cannot be empty".to_string());
        }
        Ok(())
    }

    /// Convert this request into a new Persona with a generated id.
    pub fn into_persona(self) -> Persona {
        let id = generate_record_id(&self.display_name, Utc::now());
        self.into_persona_with_id(id)
    }

    /// Convert this request into a Persona keeping the given id.
    pub fn into_persona_with_id(self, id: String) -> Persona {
        Persona {
            id,
            display_name: self.display_name.trim().to_string(),
            background: self.background,
            img: self
                .img
                .filter(|img| !img.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        }
    }
}
