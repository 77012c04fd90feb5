//! Record store trait.

use super::model::{Record, RecordKind};
use crate::error::{KindredError, Result};

/// An abstract store for character and persona records.
///
/// Decouples the core from the storage mechanism (JSON files, local
/// commands, a remote API).
///
/// # Implementation Notes
///
/// - `load_by_id` returns `Ok(None)` for unknown ids; errors are reserved for
///   storage failures.
/// - `delete` of an unknown id returns a `NotFound` error.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Loads a single record by kind and id.
    async fn load_by_id(&self, kind: RecordKind, id: &str) -> Result<Option<Record>>;

    /// Lists every record of the given kind.
    async fn list(&self, kind: RecordKind) -> Result<Vec<Record>>;

    /// Stores a new record and returns its id.
    ///
    /// Fails with a validation error if a record with the same id exists.
    async fn save(&self, record: Record) -> Result<String>;

    /// Replaces an existing record.
    async fn update(&self, record: Record) -> Result<()>;

    /// Removes a record.
    async fn delete(&self, kind: RecordKind, id: &str) -> Result<()>;

    /// Stores image bytes for a record kind and returns the image reference
    /// to put in the record's `img` field.
    async fn copy_image(&self, kind: RecordKind, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let _ = (file_name, bytes);
        Err(KindredError::internal(format!(
            "{} images are not supported by this store",
            kind
        )))
    }
}
