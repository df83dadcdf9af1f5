//! Serial write queue.
//!
//! One dedicated thread drains an unbounded FIFO channel. Submitting never
//! blocks; jobs run one at a time in submission order.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cacher_fs::FileSystem;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::cachable::Cachable;
use crate::error::{CacherError, CacherResult};

/// Callback invoked exactly once with the outcome of a write.
pub(crate) type Completion = Box<dyn FnOnce(CacherResult<PathBuf>) + Send + 'static>;

/// A single persist request.
pub(crate) struct WriteJob {
    /// File name as supplied by the item, for logging.
    pub name: String,
    /// Validated target path, or the validation failure to report.
    pub target: CacherResult<PathBuf>,
    pub item: Box<dyn Cachable + Send>,
    pub on_complete: Completion,
}

impl WriteJob {
    fn execute(
        target: CacherResult<PathBuf>,
        item: &(dyn Cachable + Send),
        fs: &dyn FileSystem,
    ) -> CacherResult<PathBuf> {
        let path = target?;

        let bytes = panic::catch_unwind(AssertUnwindSafe(|| item.transform()))
            .unwrap_or_else(|payload| Err(panic_message(payload).into()))
            .map_err(CacherError::Transform)?;

        fs.write_atomic(&path, &bytes).map_err(CacherError::Write)?;
        Ok(path)
    }

    /// Run the job and hand the outcome to its completion.
    fn run(self, fs: &dyn FileSystem) {
        let WriteJob {
            name,
            target,
            item,
            on_complete,
        } = self;

        let result = Self::execute(target, item.as_ref(), fs);
        match &result {
            Ok(path) => debug!(name = %name, path = %path.display(), "persisted"),
            Err(e) => warn!(name = %name, error = %e, "persist failed"),
        }

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || on_complete(result))) {
            error!(
                name = %name,
                panic = %panic_message(payload),
                "persist completion panicked"
            );
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "non-string panic payload".to_string(),
        },
    }
}

enum Job {
    Write(WriteJob),
    Flush(oneshot::Sender<()>),
}

/// Owner of the writer thread and the sending half of its channel.
pub(crate) struct WriteQueue {
    sender: Option<mpsc::UnboundedSender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl WriteQueue {
    /// Start the writer thread.
    pub fn spawn(name: &str, fs: Arc<dyn FileSystem>) -> CacherResult<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || drain(fs, receiver))
            .map_err(CacherError::SpawnWorker)?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Enqueue a write. If the queue is closed the job is handed back.
    pub fn submit(&self, job: WriteJob) -> Result<(), WriteJob> {
        let Some(sender) = &self.sender else {
            return Err(job);
        };
        sender.send(Job::Write(job)).map_err(|e| match e.0 {
            Job::Write(job) => job,
            Job::Flush(_) => unreachable!("sent a write job"),
        })
    }

    /// Enqueue a marker that resolves once every job submitted before it has
    /// run.
    pub fn flush_marker(&self) -> CacherResult<oneshot::Receiver<()>> {
        let sender = self.sender.as_ref().ok_or(CacherError::Closed)?;
        let (ack, done) = oneshot::channel();
        sender
            .send(Job::Flush(ack))
            .map_err(|_| CacherError::Closed)?;
        Ok(done)
    }
}

impl Drop for WriteQueue {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish what is queued and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.thread().id() == thread::current().id() {
                // Dropped from a completion; the worker exits once its loop ends.
                return;
            }
            if worker.join().is_err() {
                error!("writer thread panicked");
            }
        }
    }
}

fn drain(fs: Arc<dyn FileSystem>, mut receiver: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = receiver.blocking_recv() {
        match job {
            Job::Write(job) => job.run(fs.as_ref()),
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("write queue closed");
}
