use super::store::{validate_key, KeyValueStore, StoreError};
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the data directory, both local and in $HOME
pub const DATA_DIR_NAME: &str = ".daybook";

/// Get the data directory - an explicit override wins, then a local .daybook,
/// then the global ~/.daybook
pub fn get_data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }

    let current_dir = env::current_dir().context("Could not determine current directory")?;
    if let Some(local_dir) = find_local_data_dir(&current_dir) {
        return Ok(local_dir);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(DATA_DIR_NAME))
}

/// Find a local .daybook directory by walking up the directory tree
fn find_local_data_dir(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let candidate = current.join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Make sure the data directory exists
pub fn ensure_data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = get_data_dir(override_dir)?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(dir)
}

/// Initialize a local .daybook directory in the current directory
pub fn init_local_data_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    let dir = current_dir.join(DATA_DIR_NAME);

    if dir.exists() {
        anyhow::bail!("Data directory already exists: {}", dir.display());
    }

    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    Ok(dir)
}

/// Write content to a file via temp file + rename in the same directory
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
    let path = path.as_ref();
    let dir = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "file path has no parent directory")
    })?;

    let mut temp_file = NamedTempFile::new_in(dir)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Key-value store keeping one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

fn read_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    log::warn!("{} is not valid UTF-8", path.display());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl KeyValueStore for FileStore {
    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        keys.iter()
            .map(|key| {
                let path = self.key_path(key)?;
                match fs::read_to_string(&path) {
                    Ok(content) => Ok(Some(content)),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                    // Not UTF-8: still a value, just a corrupt one
                    Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                        read_lossy(&path).map(Some).map_err(|source| StoreError::Read {
                            key: key.to_string(),
                            source,
                        })
                    }
                    Err(source) => Err(StoreError::Read {
                        key: key.to_string(),
                        source,
                    }),
                }
            })
            .collect()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        atomic_write(&path, value).map_err(|source| StoreError::Write {
            key: key.to_string(),
            source,
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_data_dir_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = get_data_dir(Some(temp_dir.path())).unwrap();
        assert_eq!(dir, temp_dir.path());
    }

    #[test]
    fn test_find_local_data_dir_walks_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let local = temp_dir.path().join(DATA_DIR_NAME);
        fs::create_dir_all(&local).unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_local_data_dir(&nested), Some(local));
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("test.json");

        atomic_write(&path, "first").unwrap();
        atomic_write(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_file_store_set_get_remove() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path().join("data")).unwrap();

        store.set("todos", "[]").unwrap();
        store.set("darkMode", "true").unwrap();

        let values = store.get_many(&["todos", "missing", "darkMode"]).unwrap();
        assert_eq!(
            values,
            vec![Some("[]".to_string()), None, Some("true".to_string())]
        );

        store.remove("todos").unwrap();
        store.remove("todos").unwrap();
        assert_eq!(store.get("todos").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path()).unwrap();

        let err = store.set("../escape", "1").unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::open(temp_dir.path()).unwrap();
            store.set("lastClearDate", "\"January 5, 2025\"").unwrap();
        }

        let store = FileStore::open(temp_dir.path()).unwrap();
        assert_eq!(
            store.get("lastClearDate").unwrap().as_deref(),
            Some("\"January 5, 2025\"")
        );
    }

    #[test]
    fn test_file_store_returns_non_utf8_value() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        fs::write(temp_dir.path().join("history.json"), [0xff, 0xfe, b'{', b'}']).unwrap();

        let values = store.get_many(&["history", "todos"]).unwrap();
        assert!(values[0].as_deref().unwrap().ends_with("{}"));
        assert_eq!(values[1], None);
    }

    #[test]
    fn test_non_utf8_key_only_loses_that_key() {
        use crate::domain::ManualClock;
        use crate::persistence::{load_and_reconcile, Outbox};

        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path()).unwrap();
        store
            .set(
                "todos",
                r#"[{"id":"a","text":"A","completed":false,"createdAt":"2025-01-05T09:00:00Z"}]"#,
            )
            .unwrap();
        store.set("lastClearDate", "\"January 5, 2025\"").unwrap();
        store.set("schemaVersion", "1").unwrap();
        fs::write(temp_dir.path().join("history.json"), [0xff, 0xfe, b'{', b'}']).unwrap();

        let clock = ManualClock::at(2025, 1, 5, 9, 0);
        let mut outbox = Outbox::new();
        let loaded = load_and_reconcile(&mut store, &clock, &mut outbox).unwrap();

        assert_eq!(loaded.day.tasks.len(), 1);
        assert!(loaded.day.history.is_empty());
        assert!(temp_dir.path().join("history.corrupt.json").exists());
        assert!(store.get("history.corrupt").unwrap().is_some());
    }
}
