//! Source fallback and ordering for recent activity.

use std::collections::HashMap;
use std::sync::Arc;

use kindred_core::character::Character;
use kindred_core::recent::{RecentEntry, RecentKey, RecentSource};
use kindred_core::{KindredError, Result};

/// Number of characters shown in the "active" strip.
pub const DEFAULT_ACTIVE_CHARACTERS: usize = 3;

/// Picks the first successful provider result and normalizes it.
///
/// The winning list is deduplicated by `(character_id, persona_id)` keeping
/// the most recent occurrence, sorted by `last_used` descending (equal values
/// keep their source order), and truncated to `limit`. When every provider
/// failed the result is empty.
pub fn select_recent(results: Vec<Result<Vec<RecentEntry>>>, limit: usize) -> Vec<RecentEntry> {
    let Some(entries) = results.into_iter().find_map(|r| r.ok()) else {
        return Vec::new();
    };

    let mut positions: HashMap<RecentKey, usize> = HashMap::new();
    let mut unique: Vec<RecentEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match positions.get(&entry.key()) {
            Some(&index) => {
                if entry.last_used > unique[index].last_used {
                    unique[index] = entry;
                }
            }
            None => {
                positions.insert(entry.key(), unique.len());
                unique.push(entry);
            }
        }
    }

    unique.sort_by(|a, b| b.last_used.cmp(&a.last_used));
    unique.truncate(limit);
    unique
}

/// The `n` most recently used characters; characters never used are left out.
pub fn active_characters(characters: &[Character], n: usize) -> Vec<Character> {
    let mut used: Vec<Character> = characters
        .iter()
        .filter(|c| c.last_used.is_some())
        .cloned()
        .collect();
    used.sort_by(|a, b| b.last_used.cmp(&a.last_used));
    used.truncate(n);
    used
}

/// Merges recent activity from an ordered list of sources.
///
/// Sources are consulted in priority order and the first one that answers
/// wins; later sources are not queried.
pub struct RecentActivityAggregator {
    sources: Vec<Arc<dyn RecentSource>>,
}

impl RecentActivityAggregator {
    pub fn new(sources: Vec<Arc<dyn RecentSource>>) -> Self {
        Self { sources }
    }

    /// Never fails; source failures are logged and the next source is tried.
    pub async fn load_recent(&self, limit: usize) -> Vec<RecentEntry> {
        let mut results = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let result = source.fetch().await;
            match &result {
                Ok(entries) => {
                    tracing::debug!(
                        "[Recent] {} returned {} entries",
                        source.name(),
                        entries.len()
                    );
                    results.push(result);
                    break;
                }
                Err(e) => {
                    tracing::warn!("[Recent] Source {} failed: {}", source.name(), e);
                    results.push(result);
                }
            }
        }

        if results.iter().all(|r| r.is_err()) {
            tracing::warn!("[Recent] All recent activity sources failed");
        }
        select_recent(results, limit)
    }

    /// Deletes one pairing's history from every source.
    ///
    /// A source without the entry counts as success. Fails only when no
    /// source succeeded; the last error is returned.
    pub async fn delete_entry(&self, character_id: &str, persona_id: &str) -> Result<()> {
        let key = RecentKey::new(character_id, persona_id);
        let mut succeeded = false;
        let mut last_error: Option<KindredError> = None;

        for source in &self.sources {
            match source.delete(&key).await {
                Ok(()) => succeeded = true,
                Err(e) if e.is_not_found() => {
                    tracing::debug!("[Recent] {} has no entry for {}/{}", source.name(), character_id, persona_id);
                    succeeded = true;
                }
                Err(e) => {
                    tracing::warn!("[Recent] Delete via {} failed: {}", source.name(), e);
                    last_error = Some(e);
                }
            }
        }

        if succeeded {
            tracing::info!("[Recent] Deleted history for {}/{}", character_id, persona_id);
            Ok(())
        } else {
            Err(last_error.unwrap_or_else(|| KindredError::config("No recent activity sources configured")))
        }
    }
}
