//! Filesystem capability for the object cacher.
//!
//! The cacher never touches the host filesystem directly. It goes through the
//! [`FileSystem`] trait, which exposes exactly the three operations it needs:
//! recursive directory creation, atomic whole-file writes, and whole-file
//! reads.
//!
//! # Backends
//!
//! - [`OsFileSystem`] -- the host filesystem; atomic writes stage a temporary
//!   file next to the target and rename it into place
//! - [`InMemoryFileSystem`] -- map-backed double for tests, with fault injection
//!
//! # Design Rules
//!
//! 1. A reader never observes a partially written file.
//! 2. Recursive directory creation is idempotent.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod os;
pub mod traits;

pub use error::{FsError, FsResult};
pub use memory::InMemoryFileSystem;
pub use os::{OsFileSystem, SyncMode};
pub use traits::FileSystem;
