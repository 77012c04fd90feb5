//! Application services for Kindred.
//!
//! Everything here is written against the traits in `kindred-core`; the
//! composition root decides which implementations are injected.

pub mod chat;
pub mod recent;
pub mod record_client;
pub mod service_bootstrapper;

pub use chat::{ChatOrchestrator, ResetOutcome, SendOutcome, SessionSnapshot};
pub use recent::{RecentActivityAggregator, RecentActivityView, active_characters, select_recent};
pub use record_client::RecordClient;
pub use service_bootstrapper::ServiceBootstrapper;
