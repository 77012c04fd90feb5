//! Recent activity: merged "recently used" pairings.

mod aggregator;
mod view;

pub use aggregator::{DEFAULT_ACTIVE_CHARACTERS, RecentActivityAggregator, active_characters, select_recent};
pub use view::{RecentActivityView, ReloadTicket};
