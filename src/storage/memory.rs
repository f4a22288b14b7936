//! In-memory key-value store

use std::cell::RefCell;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{KeyValueStore, StorageError};

/// Key-value store backed by a JSON map
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything stored
    pub fn snapshot(&self) -> Value {
        Value::Object(self.items.borrow().clone())
    }
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Value, StorageError> {
        let items = self.items.borrow();
        let found: Map<String, Value> = keys
            .iter()
            .filter_map(|k| items.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect();
        Ok(Value::Object(found))
    }

    async fn set(&self, items: Value) -> Result<(), StorageError> {
        let Value::Object(map) = items else {
            return Err(StorageError::Decode("items must be an object".to_string()));
        };
        self.items.borrow_mut().extend(map);
        Ok(())
    }
}
