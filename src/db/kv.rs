use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

use crate::log_warn;

const ENABLE_LOGS: bool = true;

/// String-keyed persistence for JSON documents.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn delete(&mut self, key: &str) -> Result<()>;
}

/// Reads and decodes `key`. Undecodable values count as absent.
pub fn read_json<T: DeserializeOwned>(kv: &dyn KvStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = kv.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            log_warn!("Discarding unreadable value for '{key}': {err}");
            Ok(None)
        }
    }
}

pub fn write_json<T: Serialize + ?Sized>(kv: &mut dyn KvStore, key: &str, value: &T) -> Result<()> {
    let serialized =
        serde_json::to_string(value).with_context(|| format!("failed to serialize '{key}'"))?;
    kv.set(key, &serialized)
}
