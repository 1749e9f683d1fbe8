//! Persisted key-value storage
//!
//! Values are whole JSON documents; every write replaces the previous value.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{PostureError, PostureResult};

pub trait KvStore {
    fn get(&self, key: &str) -> PostureResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> PostureResult<()>;
    fn remove(&mut self, key: &str) -> PostureResult<()>;
}

/// In-memory store for tests and hosts that don't persist
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> PostureResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PostureResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> PostureResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.local/share/posturewatch` or the platform equivalent
    pub fn default_dir() -> Option<PathBuf> {
        let base = dirs::data_dir().or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))?;
        Some(base.join("posturewatch"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> PostureResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PostureError::StorageRead {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> PostureResult<()> {
        let write_err = |e: std::io::Error| PostureError::StorageWrite {
            key: key.to_string(),
            reason: e.to_string(),
        };
        fs::create_dir_all(&self.dir).map_err(write_err)?;
        fs::write(self.path_for(key), value).map_err(write_err)
    }

    fn remove(&mut self, key: &str) -> PostureResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PostureError::StorageWrite {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

impl<S: KvStore + ?Sized> KvStore for &mut S {
    fn get(&self, key: &str) -> PostureResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> PostureResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> PostureResult<()> {
        (**self).remove(key)
    }
}
