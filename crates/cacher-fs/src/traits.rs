use std::path::Path;

use crate::error::FsResult;

/// Filesystem capability consumed by the cacher.
///
/// All implementations must satisfy these invariants:
/// - `create_directory` with `recursive = true` is idempotent: an existing
///   directory is not an error.
/// - `write_atomic` is all-or-nothing: a concurrent `read_all` observes either
///   the previous content (or absence) or the complete new content.
/// - `read_all` never returns partially written data.
/// - Errors are propagated, never silently ignored.
pub trait FileSystem: Send + Sync {
    /// Create a directory at `path`.
    ///
    /// With `recursive`, missing ancestors are created and an existing
    /// directory is accepted. Without it, the parent must already exist.
    fn create_directory(&self, path: &Path, recursive: bool) -> FsResult<()>;

    /// Replace the file at `path` with `bytes` in a single visible step.
    ///
    /// The parent directory must already exist.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> FsResult<()>;

    /// Read the full content of the file at `path`.
    fn read_all(&self, path: &Path) -> FsResult<Vec<u8>>;
}

