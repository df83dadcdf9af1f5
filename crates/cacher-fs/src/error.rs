use std::io;
use std::path::{Path, PathBuf};

/// Errors from filesystem capability operations.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The path (or a required parent) does not exist.
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A directory was expected but a file sits at the path.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A file was expected but a directory sits at the path.
    #[error("is a directory: {}", .0.display())]
    IsADirectory(PathBuf),

    /// The path has no parent to stage an atomic write in.
    #[error("no parent directory for {}", .0.display())]
    NoParent(PathBuf),

    /// The backend rejects all mutations.
    #[error("file system is read-only")]
    ReadOnly,

    /// I/O error from the host operating system.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Wrap an I/O error for `path`, folding `NotFound` into [`FsError::NotFound`].
    pub fn io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Returns `true` if the error means the path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for filesystem operations.
pub type FsResult<T> = Result<T, FsError>;
