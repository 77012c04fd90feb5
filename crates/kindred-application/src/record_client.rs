//! Typed access to character and persona records.

use chrono::Utc;
use std::sync::Arc;

use kindred_core::character::{Character, CharacterRequest};
use kindred_core::persona::{Persona, PersonaRequest};
use kindred_core::record::{Record, RecordKind, RecordStore};
use kindred_core::{KindredError, Result};

/// Adapter over a [`RecordStore`] that speaks in characters and personas.
///
/// Absent records are reported as `KindredError::NotFound`.
#[derive(Clone)]
pub struct RecordClient {
    store: Arc<dyn RecordStore>,
}

impl RecordClient {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub async fn load_character(&self, id: &str) -> Result<Character> {
        self.store
            .load_by_id(RecordKind::Character, id)
            .await?
            .and_then(Record::into_character)
            .ok_or_else(|| KindredError::not_found(RecordKind::Character.as_str(), id))
    }

    pub async fn load_persona(&self, id: &str) -> Result<Persona> {
        self.store
            .load_by_id(RecordKind::Persona, id)
            .await?
            .and_then(Record::into_persona)
            .ok_or_else(|| KindredError::not_found(RecordKind::Persona.as_str(), id))
    }

    pub async fn list_characters(&self) -> Result<Vec<Character>> {
        Ok(self
            .store
            .list(RecordKind::Character)
            .await?
            .into_iter()
            .filter_map(Record::into_character)
            .collect())
    }

    pub async fn list_personas(&self) -> Result<Vec<Persona>> {
        Ok(self
            .store
            .list(RecordKind::Persona)
            .await?
            .into_iter()
            .filter_map(Record::into_persona)
            .collect())
    }

    /// Creates a character with an id derived from its name.
    pub async fn create_character(&self, request: CharacterRequest) -> Result<Character> {
        request.validate().map_err(KindredError::validation)?;
        let character = request.into_character();
        self.store.save(character.clone().into()).await?;
        tracing::info!("[Records] Created character '{}'", character.id);
        Ok(character)
    }

    pub async fn create_persona(&self, request: PersonaRequest) -> Result<Persona> {
        request.validate().map_err(KindredError::validation)?;
        let persona = request.into_persona();
        self.store.save(persona.clone().into()).await?;
        tracing::info!("[Records] Created persona '{}'", persona.id);
        Ok(persona)
    }

    /// Replaces an existing character, keeping its id and `last_used`.
    pub async fn update_character(&self, id: &str, request: CharacterRequest) -> Result<Character> {
        request.validate().map_err(KindredError::validation)?;
        let existing = self.load_character(id).await?;
        let mut character = request.into_character_with_id(existing.id);
        character.last_used = existing.last_used;
        self.store.update(character.clone().into()).await?;
        Ok(character)
    }

    pub async fn update_persona(&self, id: &str, request: PersonaRequest) -> Result<Persona> {
        request.validate().map_err(KindredError::validation)?;
        let existing = self.load_persona(id).await?;
        let persona = request.into_persona_with_id(existing.id);
        self.store.update(persona.clone().into()).await?;
        Ok(persona)
    }

    pub async fn delete_character(&self, id: &str) -> Result<()> {
        self.store.delete(RecordKind::Character, id).await
    }

    pub async fn delete_persona(&self, id: &str) -> Result<()> {
        self.store.delete(RecordKind::Persona, id).await
    }

    /// Sets `last_used` to now.
    pub async fn touch_character(&self, id: &str) -> Result<()> {
        let mut character = self.load_character(id).await?;
        character.last_used = Some(Utc::now());
        self.store.update(character.into()).await
    }

    /// Stores image bytes and returns the reference for the `img` field.
    pub async fn copy_image(&self, kind: RecordKind, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        self.store.copy_image(kind, file_name, bytes).await
    }
}
