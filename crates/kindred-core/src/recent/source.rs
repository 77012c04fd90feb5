//! Recent activity source trait.

use super::model::{RecentEntry, RecentKey};
use crate::error::Result;

/// One independent provider of recent activity.
///
/// Sources fail independently; the aggregator decides the fallback policy.
#[async_trait::async_trait]
pub trait RecentSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetches the source's recent entries, in the source's own order.
    async fn fetch(&self) -> Result<Vec<RecentEntry>>;

    /// Deletes the history behind one entry.
    ///
    /// Returns a `NotFound` error when the source has no such entry.
    async fn delete(&self, key: &RecentKey) -> Result<()>;
}
