//! Process-wide cache of accepted generations.
//!
//! The whole map lives in memory and is written back to a single JSON file
//! after every insert. Entries are never overwritten or expired.
//!
//! Inserts and the following file rewrite happen under one lock, so
//! concurrent requests inside this process cannot lose each other's entries.
//! Nothing protects the file against a second process writing it.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use forge_primitives::ResponseEnvelope;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{StoreError, StoreResult};

const KEY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// File-backed map from cache key to envelope.
#[derive(Debug)]
pub struct ResultCache {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, ResponseEnvelope>>,
}

impl ResultCache {
    /// Creates an empty cache that will write to `path`.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Loads the cache from `path`.
    ///
    /// Never fails: a missing, unreadable, or corrupt file is logged and the
    /// cache starts empty.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path).await {
            Ok(Some(entries)) => {
                info!(count = entries.len(), path = %path.display(), "cache loaded");
                entries
            }
            Ok(None) => {
                warn!(path = %path.display(), "no cache file found, starting with an empty cache");
                BTreeMap::new()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "cache could not be imported, starting empty"
                );
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Builds the key for a generation: prompt label and local time to the second.
    #[must_use]
    pub fn key_for<Tz>(prompt_label: &str, at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        format!("{prompt_label} {}", at.format(KEY_TIME_FORMAT))
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a copy of the entry stored under `key`.
    pub async fn get(&self, key: &str) -> Option<ResponseEnvelope> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Inserts `value` unless `key` is already present. Does not touch the file.
    ///
    /// Returns `true` when the entry was inserted.
    pub async fn insert_if_absent(&self, key: impl Into<String>, value: ResponseEnvelope) -> bool {
        insert_absent(&mut *self.entries.lock().await, key.into(), value)
    }

    /// Rewrites the backing file with the current contents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the map cannot be encoded or the file
    /// cannot be written.
    pub async fn flush(&self) -> StoreResult<()> {
        let entries = self.entries.lock().await;
        write_entries(&self.path, &entries).await
    }

    /// Inserts `value` if `key` is absent, then rewrites the file, holding the
    /// lock across both steps.
    ///
    /// Returns whether the entry was inserted. When the write fails a freshly
    /// inserted entry is removed again, so the map never serves what the file
    /// does not hold.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the file cannot be written.
    pub async fn insert_and_flush(
        &self,
        key: impl Into<String>,
        value: ResponseEnvelope,
    ) -> StoreResult<bool> {
        let key = key.into();
        let mut entries = self.entries.lock().await;
        let inserted = insert_absent(&mut entries, key.clone(), value);
        if let Err(err) = write_entries(&self.path, &entries).await {
            if inserted {
                entries.remove(&key);
            }
            return Err(err);
        }
        Ok(inserted)
    }

    /// Returns a copy of the whole map.
    pub async fn snapshot(&self) -> BTreeMap<String, ResponseEnvelope> {
        self.entries.lock().await.clone()
    }

    /// Returns the number of entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns `true` when the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

fn insert_absent(
    entries: &mut BTreeMap<String, ResponseEnvelope>,
    key: String,
    value: ResponseEnvelope,
) -> bool {
    if entries.contains_key(&key) {
        return false;
    }
    entries.insert(key, value);
    true
}

async fn read_entries(path: &Path) -> StoreResult<Option<BTreeMap<String, ResponseEnvelope>>> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::io(path, err)),
    };

    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|err| StoreError::serialization(path, err))
}

async fn write_entries(
    path: &Path,
    entries: &BTreeMap<String, ResponseEnvelope>,
) -> StoreResult<()> {
    let data = serde_json::to_vec(entries).map_err(|err| StoreError::serialization(path, err))?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|err| StoreError::io(parent, err))?;
    }
    fs::write(path, data)
        .await
        .map_err(|err| StoreError::io(path, err))?;
    info!(count = entries.len(), path = %path.display(), "saved cache");
    Ok(())
}
