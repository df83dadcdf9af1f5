use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where a cacher keeps its blobs.
///
/// In TOML a destination is written as `"temporary"` or
/// `{ named = "folder" }`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// The operating system's scratch directory.
    Temporary,
    /// A folder under the user's documents directory.
    Named(String),
}

impl Default for Destination {
    fn default() -> Self {
        Self::Temporary
    }
}

impl Destination {
    /// Resolve to an absolute root path.
    ///
    /// `documents` overrides the platform documents directory for
    /// [`Destination::Named`]. Without an override the platform directory is
    /// used, falling back to `~/Documents` where the platform reports none.
    /// A relative base is anchored at the current directory once, here.
    /// Returns `None` if no base exists or the folder is not a plain relative
    /// path.
    pub fn resolve(&self, documents: Option<&Path>) -> Option<PathBuf> {
        let root = match self {
            Self::Temporary => std::env::temp_dir(),
            Self::Named(folder) => {
                if !is_relative_folder(folder) {
                    return None;
                }
                let base = match documents {
                    Some(dir) => dir.to_path_buf(),
                    None => dirs::document_dir()
                        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))?,
                };
                base.join(folder)
            }
        };
        std::path::absolute(root).ok()
    }
}

/// Nested folders like `app/cache` are allowed. Anything that could escape
/// the documents directory, or that names the documents directory itself, is
/// not.
fn is_relative_folder(folder: &str) -> bool {
    let components: Vec<Component<'_>> = Path::new(folder).components().collect();
    components
        .iter()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && components.iter().any(|c| matches!(c, Component::Normal(_)))
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temporary => f.write_str("temporary directory"),
            Self::Named(folder) => write!(f, "folder {folder:?}"),
        }
    }
}
