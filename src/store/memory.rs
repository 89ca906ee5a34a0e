//! In-memory store backends.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::warn;

use super::{DraftStore, PromptLibrary, SavedPrompt, DRAFT_KEY};
use crate::{Error, Result};

/// Browsers give local storage roughly 5 MB per origin.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| Error::Storage("store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| Error::Storage("store lock poisoned".to_string()))
}

/// Key-value store with a byte quota over keys and values.
///
/// When a write would exceed the quota, the working draft is evicted (unless
/// it is the key being written) and the write is retried once.
#[derive(Debug, Clone)]
pub struct MemoryDraftStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    quota_bytes: usize,
}

impl MemoryDraftStore {
    pub fn new(quota_bytes: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            quota_bytes,
        }
    }

    /// Bytes currently used, counting keys and values.
    pub fn used_bytes(&self) -> Result<usize> {
        let entries = read(&self.entries)?;
        Ok(Self::usage(&entries))
    }

    pub fn quota_bytes(&self) -> usize {
        self.quota_bytes
    }

    fn usage(entries: &HashMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn fits(&self, entries: &HashMap<String, String>, key: &str, value: &str) -> bool {
        let replaced = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
        Self::usage(entries) - replaced + key.len() + value.len() <= self.quota_bytes
    }
}

impl Default for MemoryDraftStore {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA_BYTES)
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(read(&self.entries)?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = write(&self.entries)?;
        if !self.fits(&entries, key, value) {
            warn!(key, "storage quota exceeded, attempting cleanup");
            if key != DRAFT_KEY {
                entries.remove(DRAFT_KEY);
            }
            if !self.fits(&entries, key, value) {
                return Err(Error::Storage(
                    "Storage quota exceeded and all fallbacks failed".to_string(),
                ));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        write(&self.entries)?.remove(key);
        Ok(())
    }
}

/// Saved-prompt collection kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryPromptLibrary {
    records: Arc<RwLock<Vec<SavedPrompt>>>,
}

impl MemoryPromptLibrary {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PromptLibrary for MemoryPromptLibrary {
    async fn list_all(&self) -> Result<Vec<SavedPrompt>> {
        Ok(read(&self.records)?.clone())
    }

    async fn put(&self, record: SavedPrompt) -> Result<()> {
        let mut records = write(&self.records)?;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut records = write(&self.records)?;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }
}
