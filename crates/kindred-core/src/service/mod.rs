//! Backend service lifecycle contract.

mod launcher;
mod state;

pub use launcher::ServiceLauncher;
pub use state::ServiceState;
