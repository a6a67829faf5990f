//! Persistence boundary: scalar slots, ordered lists and keyed records.
//!
//! The storage medium is the caller's business. `MemoryStore` backs tests and
//! is also the serialized shape used by file-backed stores.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub trait Store {
    fn get_scalar(&self, key: &str) -> Result<Option<f64>>;
    fn set_scalar(&mut self, key: &str, value: f64) -> Result<()>;

    fn get_list(&self, key: &str) -> Result<Vec<String>>;
    fn set_list(&mut self, key: &str, values: Vec<String>) -> Result<()>;

    fn get_record(&self, key: &str) -> Result<Option<Value>>;
    fn upsert_record(&mut self, key: &str, record: Value) -> Result<()>;

    /// Make pending writes durable. In-memory stores have nothing to do.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub scalars: BTreeMap<String, f64>,
    #[serde(default)]
    pub lists: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub records: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get_scalar(&self, key: &str) -> Result<Option<f64>> {
        Ok(self.scalars.get(key).copied())
    }

    fn set_scalar(&mut self, key: &str, value: f64) -> Result<()> {
        self.scalars.insert(key.to_string(), value);
        Ok(())
    }

    fn get_list(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.lists.get(key).cloned().unwrap_or_default())
    }

    fn set_list(&mut self, key: &str, values: Vec<String>) -> Result<()> {
        self.lists.insert(key.to_string(), values);
        Ok(())
    }

    fn get_record(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.records.get(key).cloned())
    }

    fn upsert_record(&mut self, key: &str, record: Value) -> Result<()> {
        self.records.insert(key.to_string(), record);
        Ok(())
    }
}
