/// In-memory key-value backend
use crate::{error::ClinicResult, storage::KeyValueStore};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Process-local store; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ClinicResult<Option<String>> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClinicResult<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClinicResult<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("medtech-token").unwrap(), None);

        store.set("medtech-token", "t1").unwrap();
        assert_eq!(store.get("medtech-token").unwrap().as_deref(), Some("t1"));

        store.set("medtech-token", "t2").unwrap();
        assert_eq!(store.get("medtech-token").unwrap().as_deref(), Some("t2"));
        assert_eq!(store.len(), 1);

        store.remove("medtech-token").unwrap();
        assert_eq!(store.get("medtech-token").unwrap(), None);

        // Removing again is fine
        store.remove("medtech-token").unwrap();
    }
}
