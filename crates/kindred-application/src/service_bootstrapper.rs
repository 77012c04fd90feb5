//! Brings backend services up once per process.

use std::sync::Arc;
use tokio::sync::Mutex;

use kindred_core::chat::ChatError;
use kindred_core::service::{ServiceLauncher, ServiceState};

/// Ensures services are running before chat traffic is sent.
///
/// A successful start is recorded in the shared [`ServiceState`] and later
/// calls return immediately. A failed start leaves the state untouched so the
/// next call tries again from scratch.
pub struct ServiceBootstrapper {
    launcher: Arc<dyn ServiceLauncher>,
    state: Arc<ServiceState>,
    /// Serializes first starts so the launcher runs once.
    start_lock: Mutex<()>,
}

impl ServiceBootstrapper {
    pub fn new(launcher: Arc<dyn ServiceLauncher>, state: Arc<ServiceState>) -> Self {
        Self {
            launcher,
            state,
            start_lock: Mutex::new(()),
        }
    }

    pub async fn ensure_services_started(&self) -> Result<(), ChatError> {
        if self.state.is_started() {
            return Ok(());
        }

        let _guard = self.start_lock.lock().await;
        if self.state.is_started() {
            return Ok(());
        }

        tracing::info!("[Bootstrap] Starting backend services");
        match self.launcher.start().await {
            Ok(()) => {
                self.state.mark_started();
                tracing::info!("[Bootstrap] Backend services ready");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("[Bootstrap] Failed to start backend services: {}", e);
                Err(ChatError::service_unavailable(e.to_string()))
            }
        }
    }

    /// Readiness flag for status indicators.
    pub fn is_ready(&self) -> bool {
        self.state.is_started()
    }

    /// Asks the launcher whether the services answer right now.
    pub async fn check_health(&self) -> bool {
        self.launcher.is_healthy().await
    }

    pub async fn shutdown(&self) {
        let _guard = self.start_lock.lock().await;
        self.launcher.shutdown().await;
        self.state.mark_stopped();
        tracing::info!("[Bootstrap] Backend services stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_core::{KindredError, Result};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingLauncher {
        starts: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait::async_trait]
    impl ServiceLauncher for CountingLauncher {
        async fn start(&self) -> Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail.load(Ordering::SeqCst) {
                Err(KindredError::network("connection refused"))
            } else {
                Ok(())
            }
        }

        async fn is_healthy(&self) -> bool {
            !self.fail.load(Ordering::SeqCst)
        }
    }

    fn bootstrapper(launcher: Arc<CountingLauncher>) -> (ServiceBootstrapper, Arc<ServiceState>) {
        let state = Arc::new(ServiceState::new());
        (ServiceBootstrapper::new(launcher, state.clone()), state)
    }

    #[tokio::test]
    async fn test_start_is_memoized() {
        let launcher = Arc::new(CountingLauncher::default());
        let (bootstrapper, state) = bootstrapper(launcher.clone());

        bootstrapper.ensure_services_started().await.unwrap();
        bootstrapper.ensure_services_started().await.unwrap();

        assert_eq!(launcher.starts.load(Ordering::SeqCst), 1);
        assert!(state.is_started());
        assert!(bootstrapper.is_ready());
    }

    #[tokio::test]
    async fn test_failure_is_retried_from_scratch() {
        let launcher = Arc::new(CountingLauncher::default());
        launcher.fail.store(true, Ordering::SeqCst);
        let (bootstrapper, _state) = bootstrapper(launcher.clone());

        let err = bootstrapper.ensure_services_started().await.unwrap_err();
        assert!(matches!(err, ChatError::ServiceUnavailable(_)));
        assert!(!bootstrapper.is_ready());

        launcher.fail.store(false, Ordering::SeqCst);
        bootstrapper.ensure_services_started().await.unwrap();

        assert_eq!(launcher.starts.load(Ordering::SeqCst), 2);
        assert!(bootstrapper.is_ready());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_calls_launch_once() {
        let launcher = Arc::new(CountingLauncher::default());
        let (bootstrapper, _state) = bootstrapper(launcher.clone());
        let bootstrapper = Arc::new(bootstrapper);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let b = bootstrapper.clone();
                tokio::spawn(async move { b.ensure_services_started().await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(launcher.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shared_state_skips_launch() {
        let launcher = Arc::new(CountingLauncher::default());
        let state = Arc::new(ServiceState::new());
        state.mark_started();
        let bootstrapper = ServiceBootstrapper::new(launcher.clone(), state);

        bootstrapper.ensure_services_started().await.unwrap();
        assert_eq!(launcher.starts.load(Ordering::SeqCst), 0);

        bootstrapper.shutdown().await;
        assert!(!bootstrapper.is_ready());
    }
}
