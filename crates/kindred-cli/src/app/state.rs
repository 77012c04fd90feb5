use std::sync::Arc;

use kindred_application::{
    ChatOrchestrator, RecentActivityAggregator, RecordClient, ServiceBootstrapper,
};
use kindred_infrastructure::{AppConfig, KindredPaths};

/// Services shared by every command.
pub struct AppState {
    pub config: AppConfig,
    pub paths: KindredPaths,
    pub records: RecordClient,
    pub recent: RecentActivityAggregator,
    pub bootstrapper: Arc<ServiceBootstrapper>,
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl AppState {
    /// Stops services started by this process.
    pub async fn shutdown(&self) {
        if self.bootstrapper.is_ready() {
            self.bootstrapper.shutdown().await;
        }
    }
}
