//! Chat-facing error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::RecordKind;

/// Errors surfaced to the chat view.
///
/// `ServiceUnavailable` and `RecordNotFound` block readiness;
/// `BackendUnreachable` is dismissible; `Superseded` marks a result that
/// arrived for a session that has since been replaced and is never shown.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum ChatError {
    #[error("Backend services are unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("{kind} '{id}' could not be loaded")]
    RecordNotFound { kind: RecordKind, id: String },

    #[error("Could not reach the inference backend: {0}")]
    BackendUnreachable(String),

    #[error("Session was replaced before the operation finished")]
    Superseded,

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl ChatError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    pub fn record_not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        Self::RecordNotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn backend_unreachable(message: impl Into<String>) -> Self {
        Self::BackendUnreachable(message.into())
    }

    /// Blocking errors keep the session out of `Ready` until a retry succeeds.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable(_) | Self::RecordNotFound { .. }
        )
    }
}
