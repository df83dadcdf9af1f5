use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FsError, FsResult};
use crate::traits::FileSystem;

/// Durability strategy for atomic writes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` the staged file before it is renamed into place.
    EveryWrite,
    /// Rely on OS page-cache buffering (fastest, least durable).
    OsDefault,
}

impl Default for SyncMode {
    fn default() -> Self {
        Self::OsDefault
    }
}

/// [`FileSystem`] backed by the host operating system.
///
/// Atomic writes stage the bytes in a uniquely named temporary file inside
/// the destination's directory and rename it over the target, so readers see
/// either the old file or the new one.
#[derive(Clone, Debug, Default)]
pub struct OsFileSystem {
    sync_mode: SyncMode,
}

impl OsFileSystem {
    /// Create a filesystem handle with the given sync strategy.
    pub fn new(sync_mode: SyncMode) -> Self {
        Self { sync_mode }
    }

    /// The configured sync strategy.
    pub fn sync_mode(&self) -> &SyncMode {
        &self.sync_mode
    }
}

impl FileSystem for OsFileSystem {
    fn create_directory(&self, path: &Path, recursive: bool) -> FsResult<()> {
        let created = if recursive {
            fs::create_dir_all(path)
        } else {
            fs::create_dir(path)
        };
        created.map_err(|e| {
            if path.is_file() {
                FsError::NotADirectory(path.to_path_buf())
            } else {
                FsError::io(path, e)
            }
        })?;

        debug!(path = %path.display(), recursive, "directory ready");
        Ok(())
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> FsResult<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            Some(_) => Path::new("."),
            None => return Err(FsError::NoParent(path.to_path_buf())),
        };
        if path.is_dir() {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }

        let mut staged = tempfile::Builder::new()
            .prefix(".cacher-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| FsError::io(parent, e))?;
        staged
            .write_all(bytes)
            .map_err(|e| FsError::io(staged.path(), e))?;
        staged.flush().map_err(|e| FsError::io(staged.path(), e))?;

        if matches!(self.sync_mode, SyncMode::EveryWrite) {
            staged
                .as_file()
                .sync_all()
                .map_err(|e| FsError::io(staged.path(), e))?;
        }

        // The staged file is removed by its guard if the rename fails.
        staged
            .persist(path)
            .map_err(|e| FsError::io(path, e.error))?;

        debug!(path = %path.display(), len = bytes.len(), "atomic write");
        Ok(())
    }

    fn read_all(&self, path: &Path) -> FsResult<Vec<u8>> {
        if path.is_dir() {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }
        fs::read(path).map_err(|e| FsError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn create_directory_recursive_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        let fs = OsFileSystem::default();

        fs.create_directory(&nested, true).unwrap();
        fs.create_directory(&nested, true).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn create_directory_non_recursive_needs_parent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("missing").join("child");
        let err = OsFileSystem::default()
            .create_directory(&nested, false)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn create_directory_over_file_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        fs::write(&file, b"x").unwrap();

        let err = OsFileSystem::default()
            .create_directory(&file, true)
            .unwrap_err();
        assert!(matches!(err, FsError::NotADirectory(_)));
    }

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.json");
        let fs = OsFileSystem::new(SyncMode::EveryWrite);

        fs.write_atomic(&path, br#"{"a":1}"#).unwrap();
        assert_eq!(fs.read_all(&path).unwrap(), br#"{"a":1}"#);
    }

    #[test]
    fn write_replaces_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob");
        let fs = OsFileSystem::default();

        fs.write_atomic(&path, b"first version, longer").unwrap();
        fs.write_atomic(&path, b"second").unwrap();
        assert_eq!(fs.read_all(&path).unwrap(), b"second");
    }

    #[test]
    fn write_leaves_no_staging_files() {
        let dir = TempDir::new().unwrap();
        let fs = OsFileSystem::default();
        fs.write_atomic(&dir.path().join("one"), b"1").unwrap();
        fs.write_atomic(&dir.path().join("two"), b"2").unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("file");
        let err = OsFileSystem::default().write_atomic(&path, b"x").unwrap_err();
        assert!(err.is_not_found());
        assert!(!path.exists());
    }

    #[test]
    fn write_over_directory_fails() {
        let dir = TempDir::new().unwrap();
        let err = OsFileSystem::default()
            .write_atomic(dir.path(), b"x")
            .unwrap_err();
        assert!(matches!(err, FsError::IsADirectory(_)));
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = OsFileSystem::default()
            .read_all(&dir.path().join("missing"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn concurrent_reads_never_see_torn_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contended");
        let old = vec![b'a'; 256 * 1024];
        let new = vec![b'b'; 256 * 1024];
        let fs = Arc::new(OsFileSystem::default());
        fs.write_atomic(&path, &old).unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let reader = {
            let fs = Arc::clone(&fs);
            let done = Arc::clone(&done);
            let path = path.clone();
            let (old, new) = (old.clone(), new.clone());
            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    let seen = fs.read_all(&path).unwrap();
                    assert!(seen == old || seen == new, "torn read of {} bytes", seen.len());
                }
            })
        };

        for i in 0..50 {
            let bytes = if i % 2 == 0 { &new } else { &old };
            fs.write_atomic(&path, bytes).unwrap();
        }
        done.store(true, Ordering::Release);
        reader.join().expect("reader thread should not panic");
    }

    #[test]
    fn sync_mode_serde() {
        let json = serde_json::to_string(&SyncMode::EveryWrite).unwrap();
        assert_eq!(json, "\"every_write\"");
        let back: SyncMode = serde_json::from_str("\"os_default\"").unwrap();
        assert_eq!(back, SyncMode::OsDefault);
    }
}
