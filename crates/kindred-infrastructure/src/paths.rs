//! Unified path management for Kindred files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/kindred/           # Config directory
//! ├── config.toml              # Application configuration
//! └── logs/                    # Application logs
//!     └── kindred.log.YYYY-MM-DD
//!
//! ~/.local/share/kindred/      # Data directory
//! ├── characters.json          # Character records
//! ├── personas.json            # Persona records
//! ├── history/                 # <characterId>_<personaId>.json transcripts
//! └── assets/
//!     ├── characters/          # Character images
//!     └── personas/            # Persona images
//! ```
//!
//! A base directory can be supplied (tests, portable installs); config and
//! data then both live under it.

use kindred_core::record::RecordKind;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "kindred";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for kindred_core::KindredError {
    fn from(err: PathError) -> Self {
        kindred_core::KindredError::config(err.to_string())
    }
}

/// Resolves every file location used by Kindred.
#[derive(Debug, Clone)]
pub struct KindredPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl KindredPaths {
    /// Resolves paths under `base_dir`, or the platform directories when `None`.
    pub fn new(base_dir: Option<&Path>) -> Result<Self, PathError> {
        match base_dir {
            Some(base) => Ok(Self {
                config_dir: base.to_path_buf(),
                data_dir: base.to_path_buf(),
            }),
            None => {
                let config_dir = dirs::config_dir()
                    .ok_or(PathError::HomeDirNotFound)?
                    .join(APP_DIR);
                let data_dir = dirs::data_dir()
                    .ok_or(PathError::HomeDirNotFound)?
                    .join(APP_DIR);
                Ok(Self {
                    config_dir,
                    data_dir,
                })
            }
        }
    }

    /// Moves record data to another directory (the `data_dir` config key).
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    pub fn characters_file(&self) -> PathBuf {
        self.data_dir.join("characters.json")
    }

    pub fn personas_file(&self) -> PathBuf {
        self.data_dir.join("personas.json")
    }

    pub fn history_dir(&self) -> PathBuf {
        self.data_dir.join("history")
    }

    pub fn assets_dir(&self, kind: RecordKind) -> PathBuf {
        let sub = match kind {
            RecordKind::Character => "characters",
            RecordKind::Persona => "personas",
        };
        self.data_dir.join("assets").join(sub)
    }
}
