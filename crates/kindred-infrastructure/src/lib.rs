//! Infrastructure for Kindred: file storage, configuration, and the HTTP and
//! process collaborators behind the core traits.

pub mod config;
pub mod http_backend;
pub mod json_record_store;
pub mod paths;
pub mod process_launcher;
pub mod recent;
pub mod storage;

pub use config::{AppConfig, ConfigService, ServiceSpec};
pub use http_backend::HttpInferenceBackend;
pub use json_record_store::JsonFileRecordStore;
pub use paths::KindredPaths;
pub use process_launcher::ProcessServiceLauncher;
pub use recent::{HistoryDirRecentSource, HttpRecentSource};
