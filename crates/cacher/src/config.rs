use std::path::{Path, PathBuf};

use cacher_fs::SyncMode;
use serde::{Deserialize, Serialize};

use crate::destination::Destination;
use crate::error::{CacherError, CacherResult};

/// Configuration for a [`Cacher`](crate::Cacher).
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// destination = { named = "my-app" }
/// sync = "every_write"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacherConfig {
    /// Where blobs are stored.
    pub destination: Destination,
    /// Base directory for [`Destination::Named`], replacing the platform
    /// documents directory.
    pub documents_dir: Option<PathBuf>,
    /// Durability of writes on the host filesystem.
    pub sync: SyncMode,
    /// Thread name of the background writer.
    pub worker_name: String,
}

impl Default for CacherConfig {
    fn default() -> Self {
        Self {
            destination: Destination::Temporary,
            documents_dir: None,
            sync: SyncMode::OsDefault,
            worker_name: "cacher-writer".into(),
        }
    }
}

impl CacherConfig {
    /// Default configuration for the given destination.
    pub fn for_destination(destination: Destination) -> Self {
        Self {
            destination,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> CacherResult<Self> {
        toml::from_str(text).map_err(|e| CacherError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: &Path) -> CacherResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CacherError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
