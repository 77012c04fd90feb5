//! Composition root.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use kindred_application::{
    ChatOrchestrator, RecentActivityAggregator, RecordClient, ServiceBootstrapper,
};
use kindred_core::recent::RecentSource;
use kindred_core::record::RecordStore;
use kindred_core::service::ServiceState;
use kindred_infrastructure::{
    ConfigService, HistoryDirRecentSource, HttpInferenceBackend, HttpRecentSource,
    JsonFileRecordStore, KindredPaths, ProcessServiceLauncher,
};

use super::AppState;

/// Resolves the config and data directories.
pub fn resolve_paths(base_dir: Option<&Path>) -> Result<KindredPaths> {
    KindredPaths::new(base_dir).context("Failed to resolve Kindred directories")
}

/// Wires the concrete collaborators into the application services.
pub fn bootstrap(paths: KindredPaths) -> Result<AppState> {
    let config_service = ConfigService::new(paths.config_file());
    let config = config_service
        .load()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;
    tracing::info!("[Bootstrap] Loaded configuration from {}", config_service.path().display());

    let paths = match &config.data_dir {
        Some(dir) => paths.with_data_dir(dir),
        None => paths,
    };
    tracing::info!("[Bootstrap] Data directory: {}", paths.data_dir().display());

    let store: Arc<dyn RecordStore> = Arc::new(JsonFileRecordStore::new(paths.clone()));
    let records = RecordClient::new(store.clone());

    let backend = HttpInferenceBackend::new(&config.api_base_url, config.request_timeout())?;
    let launcher = Arc::new(ProcessServiceLauncher::from_config(&config, backend.clone()));
    let service_state = Arc::new(ServiceState::new());
    let bootstrapper = Arc::new(ServiceBootstrapper::new(launcher, service_state));

    // Network first, local history as fallback.
    let sources: Vec<Arc<dyn RecentSource>> = vec![
        Arc::new(HttpRecentSource::new(
            &config.recent_chats_url,
            config.request_timeout(),
        )?),
        Arc::new(HistoryDirRecentSource::new(paths.history_dir(), store)),
    ];
    let recent = RecentActivityAggregator::new(sources);

    let orchestrator = Arc::new(ChatOrchestrator::new(
        bootstrapper.clone(),
        records.clone(),
        Arc::new(backend),
    ));

    Ok(AppState {
        config,
        paths,
        records,
        recent,
        bootstrapper,
        orchestrator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bootstrap_creates_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let paths = resolve_paths(Some(temp_dir.path())).unwrap();

        let state = bootstrap(paths).unwrap();

        assert!(temp_dir.path().join("config.toml").exists());
        assert_eq!(state.config.recent_limit, 5);
        assert_eq!(state.paths.data_dir(), temp_dir.path());
        assert!(!state.bootstrapper.is_ready());
    }

    #[test]
    fn test_bootstrap_honours_data_dir_override() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("elsewhere");
        std::fs::write(
            temp_dir.path().join("config.toml"),
            format!("data_dir = {:?}\n", data.display().to_string()),
        )
        .unwrap();

        let state = bootstrap(resolve_paths(Some(temp_dir.path())).unwrap()).unwrap();
        assert_eq!(state.paths.data_dir(), data.as_path());
    }
}
