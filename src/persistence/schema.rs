use super::store::{
    KeyValueStore, DARK_MODE_KEY, HISTORY_KEY, LAST_CLEAR_DATE_KEY, LEGACY_HISTORY_KEY,
    SCHEMA_VERSION_KEY, TODOS_KEY,
};
use crate::domain::{DateLabel, HistoryArchive, Task};
use serde::Serialize;

/// Layout version written by this build. Version 0 is the legacy layout
/// (no `schemaVersion` key, possibly a `todosHistory` key).
pub const SCHEMA_VERSION: u32 = 1;

/// Everything read from the store at startup, after per-key fallbacks
#[derive(Debug, Clone, Default)]
pub struct StoredState {
    pub tasks: Vec<Task>,
    pub history: HistoryArchive,
    pub legacy_history: Option<HistoryArchive>,
    pub dark_mode: bool,
    pub last_clear_date: Option<DateLabel>,
    pub schema_version: u32,
    /// False when the store itself could not be read
    pub readable: bool,
}

pub fn parse_tasks(raw: &str) -> serde_json::Result<Vec<Task>> {
    serde_json::from_str(raw)
}

pub fn parse_history(raw: &str) -> serde_json::Result<HistoryArchive> {
    serde_json::from_str(raw)
}

pub fn parse_dark_mode(raw: &str) -> serde_json::Result<bool> {
    serde_json::from_str(raw)
}

/// The marker may be JSON text or, in old data, the bare label
pub fn parse_date_label(raw: &str) -> serde_json::Result<DateLabel> {
    match serde_json::from_str::<DateLabel>(raw) {
        Ok(label) => Ok(label),
        Err(e) => {
            let bare = raw.trim();
            if !bare.is_empty() && !bare.starts_with(['"', '{', '[']) {
                Ok(DateLabel::new(bare))
            } else {
                Err(e)
            }
        }
    }
}

pub fn parse_schema_version(raw: &str) -> serde_json::Result<u32> {
    serde_json::from_str(raw)
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

/// Key a corrupt raw value is copied to before it gets replaced
pub fn corrupt_backup_key(key: &str) -> String {
    format!("{}.corrupt", key)
}

/// Read every key in one batch. A key that fails to parse is logged, backed
/// up best-effort and replaced by its default. An unreadable store yields
/// all defaults with `readable` unset.
pub fn read_stored_state(store: &mut dyn KeyValueStore) -> StoredState {
    const KEYS: [&str; 6] = [
        TODOS_KEY,
        HISTORY_KEY,
        LEGACY_HISTORY_KEY,
        DARK_MODE_KEY,
        LAST_CLEAR_DATE_KEY,
        SCHEMA_VERSION_KEY,
    ];

    let values = match store.get_many(&KEYS) {
        Ok(values) => values,
        Err(e) => {
            log::error!("Could not read stored state, starting empty: {}", e);
            return StoredState::default();
        }
    };

    let mut raw = values.into_iter();
    let mut next = || raw.next().flatten();
    let (todos, history, legacy, dark_mode, last_clear, version) =
        (next(), next(), next(), next(), next(), next());

    StoredState {
        tasks: decode(store, TODOS_KEY, todos, parse_tasks).unwrap_or_default(),
        history: decode(store, HISTORY_KEY, history, parse_history)
            .map(HistoryArchive::sanitized)
            .unwrap_or_default(),
        legacy_history: decode(store, LEGACY_HISTORY_KEY, legacy, parse_history)
            .map(HistoryArchive::sanitized),
        dark_mode: decode(store, DARK_MODE_KEY, dark_mode, parse_dark_mode).unwrap_or(false),
        last_clear_date: decode(store, LAST_CLEAR_DATE_KEY, last_clear, parse_date_label),
        schema_version: decode(store, SCHEMA_VERSION_KEY, version, parse_schema_version)
            .unwrap_or(0),
        readable: true,
    }
}

fn decode<T>(
    store: &mut dyn KeyValueStore,
    key: &str,
    raw: Option<String>,
    parse: fn(&str) -> serde_json::Result<T>,
) -> Option<T> {
    let raw = raw?;
    match parse(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("Stored {} is unreadable, using default: {}", key, e);
            let backup_key = corrupt_backup_key(key);
            if let Err(e) = store.set(&backup_key, &raw) {
                log::warn!("Could not back up {} to {}: {}", key, backup_key, e);
            }
            None
        }
    }
}
