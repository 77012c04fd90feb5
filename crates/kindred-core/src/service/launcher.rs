//! Service launcher trait.

use crate::error::Result;

/// Starts the local services chat traffic depends on.
#[async_trait::async_trait]
pub trait ServiceLauncher: Send + Sync {
    /// Starts the services and returns once they answer, or fails.
    async fn start(&self) -> Result<()>;

    /// Reports whether the services currently answer health checks.
    async fn is_healthy(&self) -> bool;

    /// Stops whatever `start` launched. Default: nothing to stop.
    async fn shutdown(&self) {}
}
