//! Locally held recent-activity list.

use kindred_core::recent::{RecentEntry, RecentKey};

/// Identifies one reload started with [`RecentActivityView::begin_reload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReloadTicket(u64);

/// The list the UI renders, with optimistic removal.
///
/// Reloads and removals may interleave: a reload result is dropped when a
/// newer reload was already applied, and keys removed after a reload started
/// are filtered out of its result.
#[derive(Debug, Default)]
pub struct RecentActivityView {
    entries: Vec<RecentEntry>,
    seq: u64,
    applied: Option<u64>,
    /// Removals newer than the last applied reload.
    removed: Vec<(u64, RecentKey)>,
}

impl RecentActivityView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[RecentEntry] {
        &self.entries
    }

    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.seq += 1;
        ReloadTicket(self.seq)
    }

    /// Replaces the list with a reload result. Returns false when stale.
    pub fn apply_reload(&mut self, ticket: ReloadTicket, entries: Vec<RecentEntry>) -> bool {
        if self.applied.is_some_and(|applied| applied > ticket.0) {
            return false;
        }

        let removed_since: Vec<&RecentKey> = self
            .removed
            .iter()
            .filter(|(seq, _)| *seq > ticket.0)
            .map(|(_, key)| key)
            .collect();
        self.entries = entries
            .into_iter()
            .filter(|e| !removed_since.contains(&&e.key()))
            .collect();

        self.applied = Some(ticket.0);
        self.removed.retain(|(seq, _)| *seq > ticket.0);
        true
    }

    /// Removes exactly one key. Returns whether it was listed.
    pub fn remove(&mut self, character_id: &str, persona_id: &str) -> bool {
        self.seq += 1;
        self.removed
            .push((self.seq, RecentKey::new(character_id, persona_id)));

        let before = self.entries.len();
        self.entries.retain(|e| !e.matches(character_id, persona_id));
        self.entries.len() != before
    }
}
