use cacher_fs::FsError;
use thiserror::Error;

use crate::destination::Destination;

/// Boxed cause carried by errors that wrap caller-supplied code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the cacher.
///
/// The cacher never retries or recovers. Every failure reaches the caller
/// either as an `Err` from a synchronous call or once through a `persist`
/// completion.
#[derive(Debug, Error)]
pub enum CacherError {
    /// The root directory for the destination could not be created.
    #[error("failed to create cache directory for {destination}: {source}")]
    CreateDirectory {
        destination: Destination,
        #[source]
        source: FsError,
    },

    /// The destination could not be mapped to a directory on this platform.
    #[error("cannot resolve a directory for {0}")]
    UnresolvedDestination(Destination),

    /// The background writer thread could not be started.
    #[error("failed to spawn writer thread: {0}")]
    SpawnWorker(#[source] std::io::Error),

    /// The item failed to encode itself.
    #[error("transform failed: {0}")]
    Transform(#[source] BoxError),

    /// The encoded bytes could not be written.
    #[error("write failed: {0}")]
    Write(#[source] FsError),

    /// Reading or decoding a stored blob failed.
    ///
    /// The cause is the [`FsError`] for read failures, or the decoder's own
    /// error otherwise.
    #[error("load failed: {0}")]
    Load(#[source] BoxError),

    /// The file name is not a single, plain path component.
    #[error("invalid file name {name:?}: {reason}")]
    InvalidFileName { name: String, reason: String },

    /// Configuration could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The write queue has shut down.
    #[error("write queue is closed")]
    Closed,
}

impl CacherError {
    /// The underlying filesystem error, if this failure came from one.
    pub fn fs_error(&self) -> Option<&FsError> {
        match self {
            Self::CreateDirectory { source, .. } | Self::Write(source) => Some(source),
            Self::Load(cause) => cause.downcast_ref::<FsError>(),
            _ => None,
        }
    }

    /// Returns `true` for a load of a blob that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Load(_)) && self.fs_error().is_some_and(FsError::is_not_found)
    }
}

/// Result alias for cacher operations.
pub type CacherResult<T> = Result<T, CacherError>;
