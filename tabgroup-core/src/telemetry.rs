//! Per-group session counting
//!
//! Every time a session shows a real group, its persisted counter is bumped.
//! Store access is blocking I/O, so [`SessionTelemetry`] runs it on the tokio
//! blocking pool and only logs the outcome. Nothing here touches the group
//! registry.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::TelemetryResult;
use crate::model::GroupId;

/// Prefix of every per-group key in a session-count store.
pub const SESSION_COUNT_KEY_PREFIX: &str = "SessionsCountForGroup-";

/// Store key holding the session count of a group.
#[must_use]
pub fn session_count_key(group: GroupId) -> String {
    format!("{SESSION_COUNT_KEY_PREFIX}{}", group.get())
}

/// Persistent counter storage keyed by string.
pub trait SessionCountStore: Send + Sync {
    /// Increments the counter for `key` and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns a `TelemetryError` if the store cannot be read or written.
    fn increment_and_get(&self, key: &str) -> TelemetryResult<u32>;

    /// Deletes the counter for `key`. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns a `TelemetryError` if the store cannot be read or written.
    fn remove(&self, key: &str) -> TelemetryResult<()>;
}

/// In-memory store, lost when dropped.
#[derive(Debug, Default)]
pub struct MemorySessionCountStore {
    counts: Mutex<HashMap<String, u32>>,
}

impl MemorySessionCountStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<u32> {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }
}

impl SessionCountStore for MemorySessionCountStore {
    fn increment_and_get(&self, key: &str) -> TelemetryResult<u32> {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let count = counts.entry(key.to_owned()).or_insert(0);
        *count = count.saturating_add(1);
        Ok(*count)
    }

    fn remove(&self, key: &str) -> TelemetryResult<()> {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Store persisted as a flat TOML table of counters.
///
/// Every call reads and rewrites the whole file under a process-local lock.
#[derive(Debug)]
pub struct FileSessionCountStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionCountStore {
    /// Creates a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every counter.
    ///
    /// # Errors
    ///
    /// Returns a `TelemetryError` if the file exists but cannot be parsed.
    pub fn read_all(&self) -> TelemetryResult<BTreeMap<String, u32>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load()
    }

    fn load(&self) -> TelemetryResult<BTreeMap<String, u32>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn store(&self, counts: &BTreeMap<String, u32>) -> TelemetryResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(counts)?)?;
        Ok(())
    }
}

impl SessionCountStore for FileSessionCountStore {
    fn increment_and_get(&self, key: &str) -> TelemetryResult<u32> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut counts = self.load()?;
        let count = counts.entry(key.to_owned()).or_insert(0);
        *count = count.saturating_add(1);
        let value = *count;
        self.store(&counts)?;
        Ok(value)
    }

    fn remove(&self, key: &str) -> TelemetryResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut counts = self.load()?;
        if counts.remove(key).is_some() {
            self.store(&counts)?;
        }
        Ok(())
    }
}

/// Drives a [`SessionCountStore`] on the tokio blocking pool.
#[derive(Clone)]
pub struct SessionTelemetry {
    store: Arc<dyn SessionCountStore>,
    runtime: Handle,
}

impl std::fmt::Debug for SessionTelemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTelemetry").finish_non_exhaustive()
    }
}

impl SessionTelemetry {
    /// Creates telemetry that spawns store work on `runtime`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionCountStore>, runtime: Handle) -> Self {
        Self { store, runtime }
    }

    /// Creates telemetry bound to the runtime of the calling task.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    #[must_use]
    pub fn on_current_runtime(store: Arc<dyn SessionCountStore>) -> Self {
        Self::new(store, Handle::current())
    }

    /// Picks the store named by the settings: a file store when a path is
    /// configured, otherwise an in-memory one.
    #[must_use]
    pub fn from_settings(settings: &crate::config::FilterSettings, runtime: Handle) -> Self {
        let store: Arc<dyn SessionCountStore> = match &settings.session_count_store {
            Some(path) => Arc::new(FileSessionCountStore::new(path.clone())),
            None => Arc::new(MemorySessionCountStore::new()),
        };
        Self::new(store, runtime)
    }

    /// Shared store handle.
    #[must_use]
    pub fn store(&self) -> Arc<dyn SessionCountStore> {
        Arc::clone(&self.store)
    }

    /// Bumps the session counter of a group in the background.
    ///
    /// The handle resolves to the new count, or `None` if the store failed
    /// (the failure is logged).
    pub fn record(&self, group: GroupId) -> JoinHandle<Option<u32>> {
        let store = Arc::clone(&self.store);
        self.runtime.spawn_blocking(move || {
            let key = session_count_key(group);
            match store.increment_and_get(&key) {
                Ok(count) => {
                    debug!(group = %group, sessions = count, "recorded group session");
                    Some(count)
                }
                Err(e) => {
                    warn!(group = %group, error = %e, "failed to record group session");
                    None
                }
            }
        })
    }

    /// Removes the session counter of a deleted group in the background.
    pub fn forget(&self, group: GroupId) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        self.runtime.spawn_blocking(move || {
            if let Err(e) = store.remove(&session_count_key(group)) {
                warn!(group = %group, error = %e, "failed to remove group session count");
            }
        })
    }
}
