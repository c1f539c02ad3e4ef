//! In-memory storage backend

use crate::error::StoreError;
use crate::store::KeyValueStore;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// In-memory storage backend
///
/// Fast but non-persistent. Used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // Every mutation is a single insert or remove, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert_eq!(store.get("forms").unwrap(), None);

        store.set("forms", "[]").unwrap();
        assert_eq!(store.get("forms").unwrap().as_deref(), Some("[]"));

        store.remove("forms").unwrap();
        // Removing a missing key is fine
        store.remove("forms").unwrap();
        assert_eq!(store.get("forms").unwrap(), None);
    }
}
