//! Process-wide service readiness state.

use std::sync::atomic::{AtomicBool, Ordering};

/// Records whether backend services were started in this process.
///
/// Created once by the composition root and shared by every session; only
/// the bootstrapper marks it.
#[derive(Debug, Default)]
pub struct ServiceState {
    started: AtomicBool,
}

impl ServiceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn mark_started(&self) {
        self.started.store(true, Ordering::Release);
    }

    /// Clears the flag at shutdown.
    pub fn mark_stopped(&self) {
        self.started.store(false, Ordering::Release);
    }
}
