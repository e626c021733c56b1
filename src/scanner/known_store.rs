use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::Value;

use crate::db::{read_json, write_json, KvStore};
use crate::models::{PersistedEntry, StoreEntry};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

pub const KNOWN_SIGNATURES_KEY: &str = "known-signatures";

pub type KnownSignatures = BTreeMap<String, StoreEntry>;

/// Persistent identifier -> best-known reading map with time-based expiry.
#[derive(Debug, Clone, Copy)]
pub struct KnownSignatureStore {
    expiration_ms: i64,
}

impl KnownSignatureStore {
    pub fn new(expiration_ms: i64) -> Self {
        Self { expiration_ms }
    }

    /// Loads the store, drops expired entries and persists the pruned map.
    pub fn load(&self, kv: &mut dyn KvStore, now_ms: i64) -> Result<KnownSignatures> {
        let mut entries = read_entries(kv)?;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now_ms, self.expiration_ms));

        let expired = before - entries.len();
        if expired > 0 {
            log_info!("Expired {expired} known signatures");
        }

        self.save(kv, &entries)?;
        Ok(entries)
    }

    pub fn save(&self, kv: &mut dyn KvStore, entries: &KnownSignatures) -> Result<()> {
        let persisted: BTreeMap<&str, PersistedEntry> = entries
            .iter()
            .map(|(id, entry)| (id.as_str(), PersistedEntry::from(entry)))
            .collect();
        write_json(kv, KNOWN_SIGNATURES_KEY, &persisted)
    }

    pub fn remove(&self, kv: &mut dyn KvStore, id: &str) -> Result<()> {
        let mut entries = read_entries(kv)?;
        if entries.remove(id).is_some() {
            self.save(kv, &entries)?;
        }
        Ok(())
    }

    pub fn clear(&self, kv: &mut dyn KvStore) -> Result<()> {
        kv.delete(KNOWN_SIGNATURES_KEY)
    }
}

/// Decodes entries one by one so a single malformed entry does not cost the
/// rest of the store.
fn read_entries(kv: &dyn KvStore) -> Result<KnownSignatures> {
    let raw: BTreeMap<String, Value> = read_json(kv, KNOWN_SIGNATURES_KEY)?.unwrap_or_default();

    let entries = raw
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<PersistedEntry>(value) {
            Ok(entry) => Some((id, StoreEntry::from(entry))),
            Err(err) => {
                log_warn!("Dropping unreadable known signature '{id}': {err}");
                None
            }
        })
        .collect();

    Ok(entries)
}
