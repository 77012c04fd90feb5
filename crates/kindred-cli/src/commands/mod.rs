pub mod characters;
pub mod chat;
pub mod personas;
pub mod recent;
pub mod services;

use anyhow::{Context, Result};
use std::path::Path;

use kindred_core::record::RecordKind;

use crate::app::AppState;

/// Copies an image file into the assets directory and returns its reference.
pub(crate) async fn import_image(state: &AppState, kind: RecordKind, path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid image path {}", path.display()))?;
    Ok(state.records.copy_image(kind, file_name, bytes).await?)
}
