//! Inference backend contract.

use serde::{Deserialize, Serialize};

use super::turn::Turn;
use crate::error::Result;

/// A chat request for one user turn.
///
/// `history` is the transcript as it stood before `input` was appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub input: String,
    pub character_id: String,
    pub persona_id: String,
    pub history: Vec<Turn>,
}

/// Clears the backend's memory of one (character, persona) conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    /// Persona id
    pub user_id: String,
    pub character_id: String,
}

/// The service that produces character replies.
///
/// Transport details stay behind this trait; every failure is reported as a
/// single error and the caller only distinguishes available from unavailable.
#[async_trait::async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Sends a user turn and returns the reply text.
    async fn ask(&self, request: &AskRequest) -> Result<String>;

    /// Resets the conversation memory for a pair.
    async fn reset(&self, request: &ResetRequest) -> Result<()>;
}
