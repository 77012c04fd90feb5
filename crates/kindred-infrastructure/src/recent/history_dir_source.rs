//! Recent activity read from the local history directory.
//!
//! Each conversation is stored as `<characterId>_<personaId>.json`, a JSON
//! array of `{role, content}` messages. Character ids may themselves contain
//! `_`, so file names are split against the ids of the known characters,
//! preferring the longest match.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use kindred_core::character::Character;
use kindred_core::recent::{RecentEntry, RecentKey, RecentSource};
use kindred_core::record::{RecordKind, RecordStore};
use kindred_core::{KindredError, Result};

const PREVIEW_CHARS: usize = 80;

#[derive(Debug, Deserialize)]
struct HistoryMessage {
    #[serde(default)]
    content: String,
}

pub(crate) fn history_file_name(character_id: &str, persona_id: &str) -> String {
    format!("{}_{}.json", character_id, persona_id)
}

/// Splits a history file stem into `(character_id, persona_id)`.
///
/// Returns `None` when no known character id followed by `_` prefixes the
/// stem, or when the persona part would be empty.
pub(crate) fn split_history_stem<'a, I, S>(stem: &'a str, known_ids: I) -> Option<(&'a str, &'a str)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut best: Option<usize> = None;
    for id in known_ids {
        let id = id.as_ref();
        if id.is_empty() || stem.len() <= id.len() + 1 {
            continue;
        }
        if stem.starts_with(id) && stem.as_bytes()[id.len()] == b'_' {
            if best.is_none_or(|len| id.len() > len) {
                best = Some(id.len());
            }
        }
    }
    best.map(|len| (&stem[..len], &stem[len + 1..]))
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

/// Recent activity derived from transcript files on disk.
pub struct HistoryDirRecentSource {
    history_dir: PathBuf,
    records: Arc<dyn RecordStore>,
}

impl HistoryDirRecentSource {
    pub fn new(history_dir: impl Into<PathBuf>, records: Arc<dyn RecordStore>) -> Self {
        Self {
            history_dir: history_dir.into(),
            records,
        }
    }

    pub fn history_dir(&self) -> &Path {
        &self.history_dir
    }

    async fn characters(&self) -> Result<HashMap<String, Character>> {
        let records = self.records.list(RecordKind::Character).await?;
        Ok(records
            .into_iter()
            .filter_map(|record| record.into_character())
            .map(|character| (character.id.clone(), character))
            .collect())
    }

    /// Modification time in epoch seconds; `None` when the file is gone.
    async fn last_modified(path: &Path) -> Option<i64> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Some(
                metadata
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs() as i64)
                    .unwrap_or(0),
            ),
            Err(e) => {
                tracing::warn!("[Recent] Skipping {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn last_message(path: &Path) -> Option<String> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("[Recent] Failed to read {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str::<Vec<HistoryMessage>>(&content) {
            Ok(messages) => messages
                .iter()
                .rev()
                .find(|m| !m.content.trim().is_empty())
                .map(|m| preview(&m.content)),
            Err(e) => {
                tracing::warn!("[Recent] Malformed history file {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl RecentSource for HistoryDirRecentSource {
    fn name(&self) -> &str {
        "history-dir"
    }

    async fn fetch(&self) -> Result<Vec<RecentEntry>> {
        if !tokio::fs::try_exists(&self.history_dir).await? {
            return Ok(Vec::new());
        }

        let characters = self.characters().await?;
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.history_dir).await?;

        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some((character_id, persona_id)) = split_history_stem(stem, characters.keys())
            else {
                tracing::debug!("[Recent] Skipping history file without a known character: {}", stem);
                continue;
            };
            let Some(character) = characters.get(character_id) else {
                continue;
            };

            let Some(last_used) = Self::last_modified(&path).await else {
                continue;
            };

            entries.push(RecentEntry {
                character_id: character_id.to_string(),
                persona_id: persona_id.to_string(),
                name: character.name.clone(),
                img: (!character.img.is_empty()).then(|| character.img.clone()),
                last_used,
                last_message: Self::last_message(&path).await,
            });
        }

        Ok(entries)
    }

    async fn delete(&self, key: &RecentKey) -> Result<()> {
        let path = self
            .history_dir
            .join(history_file_name(&key.character_id, &key.persona_id));
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!("[Recent] Deleted history file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(KindredError::not_found(
                "history",
                format!("{}/{}", key.character_id, key.persona_id),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
