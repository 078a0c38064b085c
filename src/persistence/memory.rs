use super::store::{KeyValueStore, StoreError};
use std::collections::{HashMap, HashSet};

/// In-process store, with switches to make reads or writes fail
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    failing_keys: HashSet<String>,
    unreadable: bool,
    writes: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with raw values
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Make every write (set or remove) of `key` fail until cleared
    pub fn fail_writes_to(&mut self, key: &str) {
        self.failing_keys.insert(key.to_string());
    }

    pub fn clear_failures(&mut self) {
        self.failing_keys.clear();
        self.unreadable = false;
    }

    pub fn set_unreadable(&mut self, unreadable: bool) {
        self.unreadable = unreadable;
    }

    /// Keys of successful writes, in order
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    fn check_writable(&self, key: &str) -> Result<(), StoreError> {
        if self.failing_keys.contains(key) {
            return Err(StoreError::Write {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "injected failure"),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        if self.unreadable {
            return Err(StoreError::Unavailable("store marked unreadable".to_string()));
        }
        Ok(keys.iter().map(|k| self.values.get(*k).cloned()).collect())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable(key)?;
        self.values.insert(key.to_string(), value.to_string());
        self.writes.push(key.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.check_writable(key)?;
        self.values.remove(key);
        self.writes.push(key.to_string());
        Ok(())
    }
}
