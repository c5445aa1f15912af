//! Keyed storage for per-connection and per-room state.
//!
//! The session manager only talks to [`SessionStore`], so the in-memory map can be
//! replaced by a shared or persistent backend without touching game flow.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::session::SessionError;

pub trait SessionStore<V>: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<V>, SessionError>;
    fn set(&self, key: String, value: V) -> Result<(), SessionError>;
    /// Removes the entry and returns what was stored.
    fn delete(&self, key: &str) -> Result<Option<V>, SessionError>;
    fn keys(&self) -> Result<Vec<String>, SessionError>;

    fn len(&self) -> Result<usize, SessionError> {
        Ok(self.keys()?.len())
    }

    fn is_empty(&self) -> Result<bool, SessionError> {
        Ok(self.len()? == 0)
    }

    fn contains(&self, key: &str) -> Result<bool, SessionError> {
        Ok(self.get(key)?.is_some())
    }
}

#[derive(Debug)]
pub struct MemoryStore<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V> SessionStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Result<Option<V>, SessionError> {
        let guard = self
            .entries
            .read()
            .map_err(|_| SessionError::StoragePoisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: String, value: V) -> Result<(), SessionError> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| SessionError::StoragePoisoned)?;
        guard.insert(key, value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<Option<V>, SessionError> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| SessionError::StoragePoisoned)?;
        Ok(guard.remove(key))
    }

    fn keys(&self) -> Result<Vec<String>, SessionError> {
        let guard = self
            .entries
            .read()
            .map_err(|_| SessionError::StoragePoisoned)?;
        Ok(guard.keys().cloned().collect())
    }

    fn len(&self) -> Result<usize, SessionError> {
        let guard = self
            .entries
            .read()
            .map_err(|_| SessionError::StoragePoisoned)?;
        Ok(guard.len())
    }
}
