//! Reading and writing file contents.
//!
//! The driver only talks to a [`FileStore`], so the whole pipeline can run
//! against [`MemoryStore`] in tests and against [`FsStore`] for real.

use crate::edit::atomic_write;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("{path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

impl StoreError {
    pub fn path(&self) -> &Path {
        match self {
            StoreError::Read { path, .. }
            | StoreError::Encoding { path, .. }
            | StoreError::Write { path, .. } => path,
        }
    }
}

pub trait FileStore {
    fn read(&self, path: &Path) -> Result<String, StoreError>;
    fn write(&self, path: &Path, content: &str) -> Result<(), StoreError>;
}

impl<S: FileStore + ?Sized> FileStore for &S {
    fn read(&self, path: &Path) -> Result<String, StoreError> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        (**self).write(path, content)
    }
}

/// The real filesystem. Writes are atomic and keep file permissions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl FileStore for FsStore {
    fn read(&self, path: &Path) -> Result<String, StoreError> {
        let bytes = fs::read(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|source| StoreError::Encoding {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        atomic_write(path, content.as_bytes()).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// In-memory store that counts writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<BTreeMap<PathBuf, String>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.borrow_mut().insert(path.into(), content.into());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl FileStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<String, StoreError> {
        self.get(path).ok_or_else(|| StoreError::Read {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file in memory store"),
        })
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        self.writes.set(self.writes.get() + 1);
        self.insert(path, content);
        Ok(())
    }
}
