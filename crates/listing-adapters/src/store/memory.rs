use std::collections::BTreeSet;

use dashmap::DashMap;
use listing_core::adapter::{ObjectStore, StoreError};

use super::validate_key;

/// Object store en memoria. Visibilidad inmediata tras `put`/`move_object`.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<String, Vec<u8>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        self.objects.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn move_object(&self, source: &str, dest: &str) -> Result<(), StoreError> {
        validate_key(source)?;
        validate_key(dest)?;
        if source == dest {
            return if self.objects.contains_key(source) {
                Ok(())
            } else {
                Err(StoreError::NotFound(source.to_string()))
            };
        }
        let (_, bytes) = self.objects
                             .remove(source)
                             .ok_or_else(|| StoreError::NotFound(source.to_string()))?;
        self.objects.insert(dest.to_string(), bytes);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.objects.contains_key(key))
    }

    fn list(&self, prefix: &str) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.objects
               .iter()
               .filter(|e| e.key().starts_with(prefix))
               .map(|e| e.key().clone())
               .collect())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.objects
            .get(key)
            .map(|e| e.value().clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_relocates_bytes() {
        let store = InMemoryObjectStore::new();
        store.put("staging/a.csv", b"x,y").expect("put");
        store.move_object("staging/a.csv", "a.csv").expect("move");
        assert!(!store.exists("staging/a.csv").expect("exists"));
        assert_eq!(store.get("a.csv").expect("get"), b"x,y");
        assert!(matches!(store.move_object("staging/a.csv", "b.csv"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn list_filters_by_prefix_in_key_order() {
        let store = InMemoryObjectStore::new();
        for k in ["response_data_2", "response_data_1", "other_3", "staging/response_data_0"] {
            store.put(k, b"").expect("put");
        }
        let keys: Vec<String> = store.list("response_data").expect("list").into_iter().collect();
        assert_eq!(keys, vec!["response_data_1", "response_data_2"]);
    }
}
