//! In-memory filesystem for tests and embedding.
//!
//! [`InMemoryFileSystem`] keeps files and directories in maps behind a
//! `RwLock`. Each write swaps the whole buffer under the lock, which gives the
//! same all-or-nothing visibility as a rename on disk.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{FsError, FsResult};
use crate::traits::FileSystem;

#[derive(Default)]
struct Tree {
    files: HashMap<PathBuf, Vec<u8>>,
    directories: HashSet<PathBuf>,
}

/// An in-memory implementation of [`FileSystem`].
///
/// Data is lost when the filesystem is dropped. Mutations can be switched off
/// with [`set_read_only`](Self::set_read_only) to exercise failure paths.
pub struct InMemoryFileSystem {
    tree: RwLock<Tree>,
    read_only: AtomicBool,
    create_calls: AtomicUsize,
}

impl InMemoryFileSystem {
    /// Create an empty filesystem.
    pub fn new() -> Self {
        Self {
            tree: RwLock::new(Tree::default()),
            read_only: AtomicBool::new(false),
            create_calls: AtomicUsize::new(0),
        }
    }

    /// Reject every subsequent directory creation and write with
    /// [`FsError::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Content of the file at `path`, if any.
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.tree
            .read()
            .expect("lock poisoned")
            .files
            .get(path)
            .cloned()
    }

    /// Returns `true` if a directory exists at `path`.
    pub fn directory_exists(&self, path: &Path) -> bool {
        self.tree
            .read()
            .expect("lock poisoned")
            .directories
            .contains(path)
    }

    /// Number of files currently stored.
    pub fn len(&self) -> usize {
        self.tree.read().expect("lock poisoned").files.len()
    }

    /// Returns `true` if no files are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times `create_directory` has been called.
    pub fn create_directory_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> FsResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(FsError::ReadOnly);
        }
        Ok(())
    }
}

impl Default for InMemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// A parentless or empty parent counts as the filesystem root, which always exists.
fn parent_exists(tree: &Tree, path: &Path) -> bool {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && parent.parent().is_some() => {
            tree.directories.contains(parent)
        }
        _ => true,
    }
}

impl FileSystem for InMemoryFileSystem {
    fn create_directory(&self, path: &Path, recursive: bool) -> FsResult<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;

        let mut tree = self.tree.write().expect("lock poisoned");
        if recursive {
            if let Some(file) = path.ancestors().find(|a| tree.files.contains_key(*a)) {
                return Err(FsError::NotADirectory(file.to_path_buf()));
            }
            for ancestor in path.ancestors() {
                if ancestor.as_os_str().is_empty() || ancestor.parent().is_none() {
                    break;
                }
                tree.directories.insert(ancestor.to_path_buf());
            }
            return Ok(());
        }

        if tree.files.contains_key(path) {
            return Err(FsError::NotADirectory(path.to_path_buf()));
        }
        if !parent_exists(&tree, path) {
            let parent = path.parent().unwrap_or(path);
            return Err(FsError::NotFound(parent.to_path_buf()));
        }
        tree.directories.insert(path.to_path_buf());
        Ok(())
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> FsResult<()> {
        self.check_writable()?;

        let mut tree = self.tree.write().expect("lock poisoned");
        if tree.directories.contains(path) {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }
        if path.parent().is_none() {
            return Err(FsError::NoParent(path.to_path_buf()));
        }
        if !parent_exists(&tree, path) {
            let parent = path.parent().unwrap_or(path);
            return Err(FsError::NotFound(parent.to_path_buf()));
        }
        tree.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn read_all(&self, path: &Path) -> FsResult<Vec<u8>> {
        let tree = self.tree.read().expect("lock poisoned");
        match tree.files.get(path) {
            Some(bytes) => Ok(bytes.clone()),
            None if tree.directories.contains(path) => {
                Err(FsError::IsADirectory(path.to_path_buf()))
            }
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }
}

impl std::fmt::Debug for InMemoryFileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.tree.read().expect("lock poisoned");
        f.debug_struct("InMemoryFileSystem")
            .field("file_count", &tree.files.len())
            .field("directory_count", &tree.directories.len())
            .field("read_only", &self.read_only.load(Ordering::SeqCst))
            .finish()
    }
}
