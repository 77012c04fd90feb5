//! State of the one live chat session.

use chrono::Utc;
use serde::Serialize;

use kindred_core::character::Character;
use kindred_core::chat::{ChatError, SessionStatus, Transcript, Turn};
use kindred_core::persona::Persona;

/// Point-in-time view of the session for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub character_id: Option<String>,
    pub persona_id: Option<String>,
    pub character: Option<Character>,
    pub persona: Option<Persona>,
    pub transcript: Vec<Turn>,
    pub last_error: Option<ChatError>,
    /// A reset request is in flight; sends are ignored until it completes.
    pub resetting: bool,
    pub services_ready: bool,
}

/// Mutable session state, owned by the orchestrator behind its mutex.
#[derive(Debug)]
pub(crate) struct ChatSession {
    pub(crate) generation: u64,
    pub(crate) character_id: String,
    pub(crate) persona_id: String,
    pub(crate) character: Option<Character>,
    pub(crate) persona: Option<Persona>,
    pub(crate) transcript: Transcript,
    pub(crate) status: SessionStatus,
    /// Banner text; dismissible.
    pub(crate) last_error: Option<ChatError>,
    /// Cause of the `Error` status; cleared only by a successful retry.
    pub(crate) failure: Option<ChatError>,
    pub(crate) pending_reset: bool,
}

impl ChatSession {
    pub(crate) fn new(generation: u64, character_id: &str, persona_id: &str) -> Self {
        Self {
            generation,
            character_id: character_id.to_string(),
            persona_id: persona_id.to_string(),
            character: None,
            persona: None,
            transcript: Transcript::default(),
            status: SessionStatus::Bootstrapping,
            last_error: None,
            failure: None,
            pending_reset: false,
        }
    }

    pub(crate) fn fail(&mut self, error: ChatError) {
        self.status = SessionStatus::Error;
        self.failure = Some(error.clone());
        self.last_error = Some(error);
    }

    /// Enters `Ready` with a transcript holding only the greeting.
    pub(crate) fn become_ready(&mut self, character: Character, persona: Persona) {
        self.transcript = Transcript::with_greeting(character.opening_line(), Utc::now());
        self.character = Some(character);
        self.persona = Some(persona);
        self.status = SessionStatus::Ready;
        self.failure = None;
        self.last_error = None;
    }

    pub(crate) fn greeting(&self) -> Option<String> {
        self.character.as_ref().map(Character::opening_line)
    }

    pub(crate) fn snapshot(&self, services_ready: bool) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            character_id: Some(self.character_id.clone()),
            persona_id: Some(self.persona_id.clone()),
            character: self.character.clone(),
            persona: self.persona.clone(),
            transcript: self.transcript.turns().to_vec(),
            last_error: self.last_error.clone(),
            resetting: self.pending_reset,
            services_ready,
        }
    }
}
