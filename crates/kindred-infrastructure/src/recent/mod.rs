//! Recent activity sources.

mod history_dir_source;
mod http_source;

pub use history_dir_source::HistoryDirRecentSource;
pub(crate) use history_dir_source::split_history_stem;
pub use http_source::HttpRecentSource;
