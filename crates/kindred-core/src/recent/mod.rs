//! Recent activity domain module.
//!
//! Recently used (character, persona) pairings reported by the history
//! sources. Entries are never created locally; they are aggregated, sorted
//! and deleted on request.

mod model;
mod source;

pub use model::{RecentEntry, RecentKey};
pub use source::RecentSource;
