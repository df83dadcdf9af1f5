use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cacher_fs::{FileSystem, OsFileSystem};
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::cachable::Cachable;
use crate::config::CacherConfig;
use crate::destination::Destination;
use crate::error::{BoxError, CacherError, CacherResult};
use crate::names::validate_file_name;
use crate::queue::{WriteJob, WriteQueue};

/// Name-keyed on-disk object cache.
///
/// Writes go through a private serial queue drained by one background
/// thread: [`persist`](Self::persist) returns immediately and writes land in
/// submission order. Loads run synchronously on the caller's thread and do
/// not wait for pending writes, so a load racing a persist of the same name
/// sees either the old or the new blob, never a partial one.
///
/// Dropping the cacher closes the queue and waits for queued writes to finish.
/// Two cachers sharing one root are not coordinated with each other.
pub struct Cacher {
    destination: Destination,
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    queue: WriteQueue,
}

impl Cacher {
    /// Create a cacher on the host filesystem.
    pub fn new(destination: Destination) -> CacherResult<Self> {
        Self::from_config(&CacherConfig::for_destination(destination))
    }

    /// Create a cacher on an injected filesystem.
    pub fn with_file_system(
        destination: Destination,
        fs: Arc<dyn FileSystem>,
    ) -> CacherResult<Self> {
        Self::from_config_with_file_system(&CacherConfig::for_destination(destination), fs)
    }

    /// Create a cacher on the host filesystem from a configuration.
    pub fn from_config(config: &CacherConfig) -> CacherResult<Self> {
        let fs = Arc::new(OsFileSystem::new(config.sync.clone()));
        Self::from_config_with_file_system(config, fs)
    }

    /// Create a cacher from a configuration on an injected filesystem.
    ///
    /// Resolves the destination, creates the root directory (and any missing
    /// ancestors), then starts the writer. Nothing is started if any step
    /// fails.
    pub fn from_config_with_file_system(
        config: &CacherConfig,
        fs: Arc<dyn FileSystem>,
    ) -> CacherResult<Self> {
        let destination = config.destination.clone();
        let root = destination
            .resolve(config.documents_dir.as_deref())
            .ok_or_else(|| CacherError::UnresolvedDestination(destination.clone()))?;

        fs.create_directory(&root, true)
            .map_err(|source| CacherError::CreateDirectory {
                destination: destination.clone(),
                source,
            })?;

        let queue = WriteQueue::spawn(&config.worker_name, Arc::clone(&fs))?;

        info!(%destination, root = %root.display(), "cacher ready");
        Ok(Self {
            destination,
            root,
            fs,
            queue,
        })
    }

    /// The destination this cacher was created for.
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Absolute directory all blobs live in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a blob with `file_name` is stored at.
    pub fn path_for(&self, file_name: &str) -> CacherResult<PathBuf> {
        validate_file_name(file_name)?;
        Ok(self.root.join(file_name))
    }

    // ---- Writes ----

    /// Encode and store `item` in the background.
    ///
    /// `on_complete` is called exactly once, on the writer thread, with the
    /// stored path or the failure: [`CacherError::Transform`] if encoding
    /// failed (nothing is written), [`CacherError::Write`] if the write
    /// failed, or [`CacherError::InvalidFileName`].
    pub fn persist<T, F>(&self, item: T, on_complete: F)
    where
        T: Cachable + Send + 'static,
        F: FnOnce(CacherResult<PathBuf>) + Send + 'static,
    {
        let name = item.file_name();
        let job = WriteJob {
            target: self.path_for(&name),
            name,
            item: Box::new(item),
            on_complete: Box::new(on_complete),
        };

        debug!(name = %job.name, "persist queued");
        if let Err(job) = self.queue.submit(job) {
            (job.on_complete)(Err(CacherError::Closed));
        }
    }

    /// Like [`persist`](Self::persist), delivering the outcome as a future.
    ///
    /// The write is queued immediately; awaiting only observes the outcome.
    pub fn persist_async<T>(
        &self,
        item: T,
    ) -> impl Future<Output = CacherResult<PathBuf>> + Send + 'static
    where
        T: Cachable + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.persist(item, move |result| {
            let _ = tx.send(result);
        });
        async move { rx.await.unwrap_or(Err(CacherError::Closed)) }
    }

    /// Wait until every persist submitted before this call has completed.
    pub async fn flush(&self) -> CacherResult<()> {
        let done = self.queue.flush_marker()?;
        done.await.map_err(|_| CacherError::Closed)
    }

    /// Blocking form of [`flush`](Self::flush).
    ///
    /// Must not be called from inside an async runtime or from a persist
    /// completion.
    pub fn flush_blocking(&self) -> CacherResult<()> {
        let done = self.queue.flush_marker()?;
        done.blocking_recv().map_err(|_| CacherError::Closed)
    }

    // ---- Reads ----

    /// Read `file_name` and decode it as JSON.
    ///
    /// Every call reads from disk. Read and decode failures are both
    /// [`CacherError::Load`].
    pub fn load<T>(&self, file_name: &str) -> CacherResult<T>
    where
        T: Cachable + DeserializeOwned,
    {
        self.load_with(file_name, |bytes| serde_json::from_slice::<T>(&bytes))
    }

    /// Read `file_name` and decode it with `decode`.
    ///
    /// Invalid names, read failures and decoder failures are all
    /// [`CacherError::Load`].
    pub fn load_with<T, E, F>(&self, file_name: &str, decode: F) -> CacherResult<T>
    where
        T: Cachable,
        E: Into<BoxError>,
        F: FnOnce(Vec<u8>) -> Result<T, E>,
    {
        let path = self
            .path_for(file_name)
            .map_err(|e| CacherError::Load(Box::new(e)))?;
        let bytes = self
            .fs
            .read_all(&path)
            .map_err(|e| CacherError::Load(Box::new(e)))?;
        let len = bytes.len();
        let value = decode(bytes).map_err(|e| CacherError::Load(e.into()))?;

        debug!(name = file_name, len, "loaded");
        Ok(value)
    }
}

impl std::fmt::Debug for Cacher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cacher")
            .field("destination", &self.destination)
            .field("root", &self.root)
            .finish()
    }
}
