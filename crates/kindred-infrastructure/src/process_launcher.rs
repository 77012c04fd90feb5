//! Starts the configured local services and waits for the API to answer.

use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use crate::config::{AppConfig, ServiceSpec};
use crate::http_backend::HttpInferenceBackend;
use kindred_core::service::ServiceLauncher;
use kindred_core::{KindredError, Result};

/// Spawns each configured service, then polls `GET /health`.
///
/// Children are killed on `shutdown`, when startup times out, and when the
/// launcher is dropped.
pub struct ProcessServiceLauncher {
    services: Vec<ServiceSpec>,
    health: HttpInferenceBackend,
    startup_timeout: Duration,
    poll_interval: Duration,
    children: Mutex<Vec<(String, Child)>>,
}

impl ProcessServiceLauncher {
    pub fn new(
        services: Vec<ServiceSpec>,
        health: HttpInferenceBackend,
        startup_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            services,
            health,
            startup_timeout,
            poll_interval,
            children: Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(config: &AppConfig, health: HttpInferenceBackend) -> Self {
        Self::new(
            config.services.clone(),
            health,
            config.startup_timeout(),
            config.health_poll_interval(),
        )
    }

    fn spawn(spec: &ServiceSpec) -> Result<Child> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }
        command.spawn().map_err(|e| {
            KindredError::io(format!(
                "Failed to start service '{}' ({}): {}",
                spec.name, spec.program, e
            ))
        })
    }

    async fn wait_until_healthy(&self) -> bool {
        let poll = async {
            loop {
                if self.health.check_health().await {
                    return;
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };
        tokio::time::timeout(self.startup_timeout, poll).await.is_ok()
    }

    async fn kill_children(&self) {
        let mut children = self.children.lock().await;
        for (name, mut child) in children.drain(..) {
            if let Err(e) = child.kill().await {
                tracing::warn!("[Services] Failed to stop '{}': {}", name, e);
            } else {
                tracing::info!("[Services] Stopped '{}'", name);
            }
        }
    }
}

#[async_trait::async_trait]
impl ServiceLauncher for ProcessServiceLauncher {
    async fn start(&self) -> Result<()> {
        if self.health.check_health().await {
            tracing::info!(
                "[Services] API at {} already healthy, nothing to spawn",
                self.health.base_url()
            );
            return Ok(());
        }

        {
            let mut children = self.children.lock().await;
            for spec in &self.services {
                match Self::spawn(spec) {
                    Ok(child) => {
                        tracing::info!("[Services] Spawned '{}' (pid {:?})", spec.name, child.id());
                        children.push((spec.name.clone(), child));
                    }
                    Err(e) => {
                        drop(children);
                        self.kill_children().await;
                        return Err(e);
                    }
                }
            }
        }

        if self.wait_until_healthy().await {
            tracing::info!("[Services] API at {} is healthy", self.health.base_url());
            Ok(())
        } else {
            self.kill_children().await;
            Err(KindredError::network(format!(
                "API at {} did not become healthy within {:?}",
                self.health.base_url(),
                self.startup_timeout
            )))
        }
    }

    async fn is_healthy(&self) -> bool {
        self.health.check_health().await
    }

    async fn shutdown(&self) {
        self.kill_children().await;
    }
}
