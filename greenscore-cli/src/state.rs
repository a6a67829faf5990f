use anyhow::{Context, Result};
use greenscore_core::{MemoryStore, Store};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// `$GREENSCORE_HOME`, else `~/.greenscore`
pub fn greenscore_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("GREENSCORE_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".greenscore"))
}

pub fn ensure_greenscore_home() -> Result<PathBuf> {
    let dir = greenscore_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn store_path() -> Result<PathBuf> {
    Ok(ensure_greenscore_home()?.join("store.json"))
}

/// File contents, or `None` if the file does not exist yet.
pub fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
    }
}

/// Replace `path` whole: write a sibling `.tmp` file, then rename over it.
pub fn write_replace(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))
}

/// Store backed by a single JSON file. Writes stay in memory until `flush`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: MemoryStore,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = match read_if_exists(&path)? {
            Some(s) => serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?,
            None => MemoryStore::default(),
        };
        Ok(Self { path, data })
    }
}

impl Store for JsonFileStore {
    fn get_scalar(&self, key: &str) -> Result<Option<f64>> {
        self.data.get_scalar(key)
    }

    fn set_scalar(&mut self, key: &str, value: f64) -> Result<()> {
        self.data.set_scalar(key, value)
    }

    fn get_list(&self, key: &str) -> Result<Vec<String>> {
        self.data.get_list(key)
    }

    fn set_list(&mut self, key: &str, values: Vec<String>) -> Result<()> {
        self.data.set_list(key, values)
    }

    fn get_record(&self, key: &str) -> Result<Option<Value>> {
        self.data.get_record(key)
    }

    fn upsert_record(&mut self, key: &str, record: Value) -> Result<()> {
        self.data.upsert_record(key, record)
    }

    fn flush(&mut self) -> Result<()> {
        write_replace(&self.path, &serde_json::to_string_pretty(&self.data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenscore_core::{Category, Ledger, HISTORY_CAPACITY};

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("greenscore-test-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_flush_then_reopen() {
        let dir = scratch_dir();
        let path = dir.join("store.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set_scalar("footprint.water", 42.0).unwrap();
        assert!(!path.exists(), "nothing written before flush");
        store.flush().unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_scalar("footprint.water").unwrap(), Some(42.0));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_ledger_roundtrip_through_file() {
        let dir = scratch_dir();
        let path = dir.join("store.json");

        let mut ledger = Ledger::new(HISTORY_CAPACITY);
        ledger.merge(Category::Energy, 1.5);
        ledger.append_history("ran the AC", "Category: Energy", chrono::Utc::now());

        let mut store = JsonFileStore::open(&path).unwrap();
        ledger.persist(&mut store).unwrap();

        let loaded = Ledger::load(&JsonFileStore::open(&path).unwrap(), HISTORY_CAPACITY).unwrap();
        assert_eq!(loaded.totals.energy, 1.5);
        assert_eq!(loaded.history.len(), 1);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_read_if_exists_and_write_replace() {
        let dir = scratch_dir();
        let path = dir.join("auth.json");

        assert_eq!(read_if_exists(&path).unwrap(), None);
        write_replace(&path, "first").unwrap();
        write_replace(&path, "second").unwrap();
        assert_eq!(read_if_exists(&path).unwrap().as_deref(), Some("second"));
        assert!(!dir.join("auth.json.tmp").exists());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = scratch_dir();
        let path = dir.join("store.json");
        fs::write(&path, "{not json").unwrap();
        assert!(JsonFileStore::open(&path).is_err());
        fs::remove_dir_all(dir).ok();
    }
}
