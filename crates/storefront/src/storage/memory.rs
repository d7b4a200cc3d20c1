//! In-memory storage, used by tests and ephemeral sessions.

use std::collections::HashMap;

use super::{LocalStorage, StorageResult};

/// Storage that lives only as long as the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        self.items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set_item("user", "a").unwrap();
        storage.set_item("user", "b").unwrap();
        assert_eq!(storage.get_item("user").unwrap().as_deref(), Some("b"));
        assert_eq!(storage.len(), 1);

        storage.remove_item("user").unwrap();
        storage.remove_item("user").unwrap();
        assert_eq!(storage.get_item("user").unwrap(), None);
    }
}
