//! Shared Board
//!
//! Key-value store for handing values between unrelated modules.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared key-value store
///
/// Clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct Board {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }
    
    /// Get an entry deserialized as `T`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|value| serde_json::from_value(value).ok())
    }
    
    /// Store `value` under `key`, replacing what was there
    pub fn set<T: Serialize>(&self, key: impl Into<String>, value: T) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.entries.write().unwrap_or_else(PoisonError::into_inner).insert(key.into(), value);
        Ok(())
    }
    
    pub fn has(&self, key: &str) -> bool {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).contains_key(key)
    }
    
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).remove(key)
    }
    
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
