//! Name-keyed on-disk object cache.
//!
//! A [`Cacher`] owns one root directory, resolved from a [`Destination`] when
//! it is created. Values implementing [`Cachable`] are encoded and written
//! there in the background by [`Cacher::persist`], and read back by name with
//! [`Cacher::load`] (JSON) or [`Cacher::load_with`] (caller-supplied decoder).
//!
//! ```no_run
//! use cacher::{Cacher, Destination, JsonCachable};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Profile {
//!     user: String,
//! }
//!
//! impl JsonCachable for Profile {
//!     fn file_name(&self) -> String {
//!         format!("{}.json", self.user)
//!     }
//! }
//!
//! let cacher = Cacher::new(Destination::Named("profiles".into()))?;
//! cacher.persist(Profile { user: "ada".into() }, |result| {
//!     if let Err(e) = result {
//!         eprintln!("cache write failed: {e}");
//!     }
//! });
//! cacher.flush_blocking()?;
//! let profile: Profile = cacher.load("ada.json")?;
//! # Ok::<(), cacher::CacherError>(())
//! ```
//!
//! # Guarantees
//!
//! 1. Persists run one at a time, in submission order, on a dedicated thread.
//! 2. Every persist completion is called exactly once.
//! 3. Blobs are replaced atomically; a load never sees a partial write.
//! 4. Loads always read from disk; nothing is cached in memory.
//! 5. Failures are always surfaced to the caller, never retried.

pub mod cachable;
pub mod cacher;
pub mod config;
pub mod destination;
pub mod error;
pub mod names;
mod queue;

pub use cachable::{Cachable, JsonCachable};
pub use cacher::Cacher;
pub use config::CacherConfig;
pub use destination::Destination;
pub use error::{BoxError, CacherError, CacherResult};

pub use cacher_fs::{FileSystem, FsError, InMemoryFileSystem, OsFileSystem, SyncMode};
