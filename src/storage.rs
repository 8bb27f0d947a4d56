use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Durable string key-value store, the `localStorage` contract.
///
/// Handles are shared: every page opened against the same store sees the
/// other pages' writes, and the last writer wins.
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str);
}

#[derive(Debug, Default)]
struct StorageArea {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl StorageArea {
    fn used_bytes_with(&self, key: &str, value: &str) -> usize {
        let others: usize = self
            .entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        others + key.len() + value.len()
    }
}

/// In-memory [`Storage`]. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    area: Rc<RefCell<StorageArea>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once keys plus values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::new();
        storage.area.borrow_mut().quota_bytes = Some(bytes);
        storage
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.area.borrow().entries.get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut area = self.area.borrow_mut();
        if let Some(quota) = area.quota_bytes {
            let needed = area.used_bytes_with(key, value);
            if needed > quota {
                return Err(Error::Storage(format!(
                    "quota exceeded writing {key}: needed={needed}, quota={quota}"
                )));
            }
        }
        area.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_item(&self, key: &str) {
        self.area.borrow_mut().entries.remove(key);
    }

    pub fn keys(&self) -> Vec<String> {
        self.area.borrow().entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.area.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.area.borrow_mut().entries.clear();
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        MemoryStorage::get_item(self, key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        MemoryStorage::set_item(self, key, value)
    }

    fn remove_item(&self, key: &str) {
        MemoryStorage::remove_item(self, key)
    }
}

/// Reads a JSON value. Missing keys and unparseable values both read as `None`.
pub(crate) fn read_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.get_item(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("ignoring unparseable storage entry {key}: {err}");
            None
        }
    }
}

pub(crate) fn write_json<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .map_err(|err| Error::Storage(format!("failed to serialize {key}: {err}")))?;
    storage.set_item(key, &raw)
}
