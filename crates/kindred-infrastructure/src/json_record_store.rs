//! JSON-file record store.
//!
//! ```text
//! data_dir/
//! ├── characters.json   # [Character, ...]
//! ├── personas.json     # [Persona, ...]
//! ├── history/          # removed per character on delete
//! └── assets/           # images written by copy_image
//! ```
//!
//! Every write is a locked read-modify-write of the whole file through
//! [`AtomicFile`]; blocking file I/O runs on the blocking pool.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::paths::KindredPaths;
use crate::recent::split_history_stem;
use crate::storage::AtomicFile;
use kindred_core::character::{Character, DEFAULT_IMAGE};
use kindred_core::persona::Persona;
use kindred_core::record::{Record, RecordKind, RecordStore};
use kindred_core::{KindredError, Result};

/// A record shape stored as one element of a JSON array file.
trait StoredRecord: Serialize + DeserializeOwned + Clone + Send + 'static {
    const KIND: RecordKind;

    fn record_id(&self) -> &str;
    fn into_record(self) -> Record;
    fn from_record(record: Record) -> Option<Self>;
}

impl StoredRecord for Character {
    const KIND: RecordKind = RecordKind::Character;

    fn record_id(&self) -> &str {
        &self.id
    }

    fn into_record(self) -> Record {
        Record::Character(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        record.into_character()
    }
}

impl StoredRecord for Persona {
    const KIND: RecordKind = RecordKind::Persona;

    fn record_id(&self) -> &str {
        &self.id
    }

    fn into_record(self) -> Record {
        Record::Persona(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        record.into_persona()
    }
}

async fn blocking<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| KindredError::internal(format!("Blocking task failed: {}", e)))?
}

/// Record store backed by `characters.json` and `personas.json`.
pub struct JsonFileRecordStore {
    paths: KindredPaths,
    characters: AtomicFile<Vec<Character>>,
    personas: AtomicFile<Vec<Persona>>,
    /// Serializes writers within this process; the file lock covers others.
    write_lock: Mutex<()>,
}

impl JsonFileRecordStore {
    pub fn new(paths: KindredPaths) -> Self {
        Self {
            characters: AtomicFile::json(paths.characters_file()),
            personas: AtomicFile::json(paths.personas_file()),
            paths,
            write_lock: Mutex::new(()),
        }
    }

    pub fn paths(&self) -> &KindredPaths {
        &self.paths
    }

    fn mismatched(kind: RecordKind, record: &Record) -> KindredError {
        KindredError::internal(format!(
            "Expected a {} record, got a {} record",
            kind,
            record.kind()
        ))
    }

    async fn load_all<T: StoredRecord>(file: &AtomicFile<Vec<T>>) -> Result<Vec<T>> {
        let file = file.clone();
        blocking(move || Ok(file.load()?.unwrap_or_default())).await
    }

    async fn insert<T: StoredRecord>(&self, file: &AtomicFile<Vec<T>>, record: Record) -> Result<String> {
        let item = T::from_record(record.clone()).ok_or_else(|| Self::mismatched(T::KIND, &record))?;
        let id = item.record_id().to_string();
        if id.trim().is_empty() {
            return Err(KindredError::validation(format!("{} id is required", T::KIND)));
        }

        let _guard = self.write_lock.lock().await;
        let file = file.clone();
        let saved_id = id.clone();
        blocking(move || {
            file.update(Vec::new(), |items: &mut Vec<T>| {
                if items.iter().any(|existing| existing.record_id() == id) {
                    return Err(KindredError::validation(format!(
                        "{} '{}' already exists",
                        T::KIND,
                        id
                    )));
                }
                items.push(item);
                Ok(())
            })
        })
        .await?;

        tracing::info!("[Records] Saved {} '{}'", T::KIND, saved_id);
        Ok(saved_id)
    }

    async fn replace<T: StoredRecord>(&self, file: &AtomicFile<Vec<T>>, record: Record) -> Result<()> {
        let item = T::from_record(record.clone()).ok_or_else(|| Self::mismatched(T::KIND, &record))?;

        let _guard = self.write_lock.lock().await;
        let file = file.clone();
        blocking(move || {
            file.update(Vec::new(), |items: &mut Vec<T>| {
                match items.iter_mut().find(|existing| existing.record_id() == item.record_id()) {
                    Some(slot) => {
                        *slot = item;
                        Ok(())
                    }
                    None => Err(KindredError::not_found(
                        T::KIND.as_str(),
                        item.record_id().to_string(),
                    )),
                }
            })
        })
        .await
    }

    async fn remove<T: StoredRecord>(&self, file: &AtomicFile<Vec<T>>, id: &str) -> Result<T> {
        let _guard = self.write_lock.lock().await;
        let file = file.clone();
        let id = id.to_string();
        blocking(move || {
            file.update(Vec::new(), |items: &mut Vec<T>| {
                let index = items
                    .iter()
                    .position(|existing| existing.record_id() == id)
                    .ok_or_else(|| KindredError::not_found(T::KIND.as_str(), id.clone()))?;
                Ok(items.remove(index))
            })
        })
        .await
    }

    /// Removes `<characterId>_*.json` transcripts belonging to `character_id`.
    ///
    /// Files whose name matches a longer, still existing character id are kept.
    async fn remove_character_history(&self, character_id: &str) -> Result<usize> {
        let history_dir = self.paths.history_dir();
        let mut known: Vec<String> = Self::load_all(&self.characters)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        known.push(character_id.to_string());

        let character_id = character_id.to_string();
        blocking(move || {
            if !history_dir.exists() {
                return Ok(0);
            }
            let mut removed = 0;
            for entry in std::fs::read_dir(&history_dir)?.flatten() {
                let path = entry.path();
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if split_history_stem(stem, &known).map(|(c, _)| c) == Some(character_id.as_str()) {
                    match std::fs::remove_file(&path) {
                        Ok(()) => removed += 1,
                        Err(e) => tracing::warn!(
                            "[Records] Failed to remove history file {}: {}",
                            path.display(),
                            e
                        ),
                    }
                }
            }
            Ok(removed)
        })
        .await
    }

    fn image_path(&self, kind: RecordKind, img: &str) -> Option<PathBuf> {
        if img.is_empty() || img == DEFAULT_IMAGE {
            return None;
        }
        let name = Path::new(img).file_name()?;
        Some(self.paths.assets_dir(kind).join(name))
    }
}

#[async_trait::async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn load_by_id(&self, kind: RecordKind, id: &str) -> Result<Option<Record>> {
        let found = match kind {
            RecordKind::Character => Self::load_all(&self.characters)
                .await?
                .into_iter()
                .find(|c| c.id == id)
                .map(Record::Character),
            RecordKind::Persona => Self::load_all(&self.personas)
                .await?
                .into_iter()
                .find(|p| p.id == id)
                .map(Record::Persona),
        };
        Ok(found)
    }

    async fn list(&self, kind: RecordKind) -> Result<Vec<Record>> {
        let records = match kind {
            RecordKind::Character => Self::load_all(&self.characters)
                .await?
                .into_iter()
                .map(StoredRecord::into_record)
                .collect(),
            RecordKind::Persona => Self::load_all(&self.personas)
                .await?
                .into_iter()
                .map(StoredRecord::into_record)
                .collect(),
        };
        Ok(records)
    }

    async fn save(&self, record: Record) -> Result<String> {
        match record.kind() {
            RecordKind::Character => self.insert(&self.characters, record).await,
            RecordKind::Persona => self.insert(&self.personas, record).await,
        }
    }

    async fn update(&self, record: Record) -> Result<()> {
        match record.kind() {
            RecordKind::Character => self.replace(&self.characters, record).await,
            RecordKind::Persona => self.replace(&self.personas, record).await,
        }
    }

    async fn delete(&self, kind: RecordKind, id: &str) -> Result<()> {
        match kind {
            RecordKind::Character => {
                let removed = self.remove(&self.characters, id).await?;
                let histories = self.remove_character_history(id).await?;
                if let Some(path) = self.image_path(kind, &removed.img) {
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        if e.kind() != std::io::ErrorKind::NotFound {
                            tracing::warn!("[Records] Failed to remove image {}: {}", path.display(), e);
                        }
                    }
                }
                tracing::info!(
                    "[Records] Deleted character '{}' ({} history files)",
                    id,
                    histories
                );
            }
            RecordKind::Persona => {
                self.remove(&self.personas, id).await?;
                tracing::info!("[Records] Deleted persona '{}'", id);
            }
        }
        Ok(())
    }

    async fn copy_image(&self, kind: RecordKind, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| KindredError::validation(format!("Invalid image file name: '{}'", file_name)))?
            .to_string();

        let dir = self.paths.assets_dir(kind);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), bytes).await?;

        tracing::debug!("[Records] Copied {} image '{}'", kind, name);
        Ok(name)
    }
}
