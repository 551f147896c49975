use std::collections::HashMap;
use std::sync::Mutex;

use crate::ports::storage::{KeyValueStore, StoreError};

/// In-memory store, contents are lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(key: &str) -> StoreError {
    StoreError::Write {
        key: key.to_string(),
        reason: "store lock poisoned".to_string(),
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Read {
            key: key.to_string(),
            reason: "store lock poisoned".to_string(),
        })?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .map_err(|_| poisoned(key))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().map_err(|_| poisoned(key))?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("theme", "dark").unwrap();
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").unwrap(), Some("light".to_string()));
        assert_eq!(store.len(), 1);

        store.remove("theme").unwrap();
        store.remove("theme").unwrap();
        assert!(store.get("theme").unwrap().is_none());
    }
}
