//! Key/value session store with optional JSON-file persistence.

use dashmap::DashMap;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Key under which the connected wallet address is persisted.
pub const WALLET_ADDRESS_KEY: &str = "walletAddress";

/// Errors raised by the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Refusing to store an empty value for '{0}'")]
    EmptyValue(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// A thread-safe key/value store, saved to disk after every mutation.
///
/// Mutations are serialized and hit the disk before memory, so a failed
/// save leaves both exactly as they were.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<String, String>>,
    writes: Arc<Mutex<()>>,
    persistence_path: Option<PathBuf>,
}

impl SessionStore {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            writes: Arc::new(Mutex::new(())),
            persistence_path,
        }
    }

    /// Load from file if it exists; the file is also the save target.
    pub fn load_from_file(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref();
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let map: HashMap<String, String> = serde_json::from_reader(reader)?;
            for (k, v) in map {
                store.inner.insert(k, v);
            }
            tracing::info!(path = %path.display(), entries = store.inner.len(), "Session loaded");
        }
        Ok(store)
    }

    /// Save to file. No-op for in-memory stores.
    pub fn save_to_file(&self) -> SessionResult<()> {
        let _guard = self.lock_writes();
        self.write_snapshot(&self.snapshot())
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded value is (); a panicked writer leaves nothing torn
        self.writes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshot(&self) -> HashMap<String, String> {
        self.inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    /// Write `map` to a fresh temp file next to the target, then rename it
    /// into place.
    fn write_snapshot(&self, map: &HashMap<String, String>) -> SessionResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, map)?;
            writer.flush()?;
        }
        tmp.persist(path).map_err(|e| e.error)?;
        tracing::debug!(path = %path.display(), entries = map.len(), "Session saved");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    /// Store a non-empty value and persist.
    pub fn set(&self, key: &str, value: &str) -> SessionResult<()> {
        if value.trim().is_empty() {
            return Err(SessionError::EmptyValue(key.to_string()));
        }

        let _guard = self.lock_writes();
        let mut next = self.snapshot();
        next.insert(key.to_string(), value.to_string());
        self.write_snapshot(&next)?;
        self.inner.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Remove a key and persist. Returns the removed value.
    pub fn remove(&self, key: &str) -> SessionResult<Option<String>> {
        let _guard = self.lock_writes();
        let mut next = self.snapshot();
        let removed = next.remove(key);
        self.write_snapshot(&next)?;
        self.inner.remove(key);
        Ok(removed)
    }

    pub fn wallet_address(&self) -> Option<String> {
        self.get(WALLET_ADDRESS_KEY)
            .filter(|address| !address.trim().is_empty())
    }

    pub fn set_wallet_address(&self, address: &str) -> SessionResult<()> {
        self.set(WALLET_ADDRESS_KEY, address.trim())
    }

    pub fn clear_wallet_address(&self) -> SessionResult<Option<String>> {
        self.remove(WALLET_ADDRESS_KEY)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("entries", &self.inner.len())
            .field("persistence_path", &self.persistence_path)
            .finish()
    }
}
