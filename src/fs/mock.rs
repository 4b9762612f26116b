// src/fs/mock.rs

use super::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEntry {
    File,
    Dir,
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Paths whose creation fails with the given error kind.
    failures: HashMap<PathBuf, io::ErrorKind>,
    /// Every `create_dir_all` call, in order.
    create_calls: Vec<PathBuf>,
}

/// In-memory filesystem for resolver tests.
///
/// Clones share state, so a test can keep a handle while the resolver owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.lock();
        if let Some(parent) = path.parent() {
            insert_dirs(&mut state.entries, parent);
        }
        state.entries.insert(path.to_path_buf(), MockEntry::File);
    }

    /// Make `create_dir_all(path)` fail with `kind`.
    pub fn fail_create(&self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        self.lock().failures.insert(path.as_ref().to_path_buf(), kind);
    }

    pub fn create_calls(&self) -> Vec<PathBuf> {
        self.lock().create_calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only happens after a panicking test; keep going.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn insert_dirs(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    for ancestor in path.ancestors().filter(|a| !a.as_os_str().is_empty()) {
        entries
            .entry(ancestor.to_path_buf())
            .or_insert(MockEntry::Dir);
    }
}

impl FileSystem for MockFileSystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        state.create_calls.push(path.to_path_buf());

        if let Some(kind) = state.failures.get(path) {
            return Err(io::Error::new(*kind, format!("mock failure for {:?}", path)));
        }

        let blocked = path
            .ancestors()
            .find(|a| matches!(state.entries.get(*a), Some(MockEntry::File)));
        if let Some(file) = blocked {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{:?} exists and is not a directory", file),
            ));
        }

        insert_dirs(&mut state.entries, path);
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::Dir))
    }
}
