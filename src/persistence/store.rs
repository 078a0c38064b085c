use thiserror::Error;

/// Active task list
pub const TODOS_KEY: &str = "todos";
/// Canonical history archive
pub const HISTORY_KEY: &str = "history";
/// Older name of the history archive, migrated into `history` on load
pub const LEGACY_HISTORY_KEY: &str = "todosHistory";
/// Dark theme preference
pub const DARK_MODE_KEY: &str = "darkMode";
/// Day the active list belongs to
pub const LAST_CLEAR_DATE_KEY: &str = "lastClearDate";
/// Layout version of the stored keys
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),

    #[error("failed to read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed durable storage holding serialized JSON values
pub trait KeyValueStore {
    /// Fetch several keys at once. The result lines up with `keys`;
    /// missing keys come back as `None`.
    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key. Deleting a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_many(&[key])?.into_iter().next().flatten())
    }
}

/// Keys are used as file names, so only a plain subset is allowed
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
