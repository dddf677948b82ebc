use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use super::StreakStore;
use crate::error::StoreError;

/// In-memory store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStreakStore {
    values: RwLock<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryStreakStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.write() {
            values.remove(key);
        }
    }

    /// Make every read fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl StreakStore for MemoryStreakStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store marked unavailable".into()));
        }
        let values = self
            .values
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        Ok(values.get(key).cloned())
    }
}
