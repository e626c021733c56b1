use serde::{Deserialize, Serialize};

/// Descriptive fields of one scan line, as parsed.
///
/// This is both the ephemeral parse result and the `data` snapshot the known
/// store remembers for an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureData {
    pub id: String,
    pub category: String,
    pub subcategory: String,
    pub name: String,
    /// Signal strength exactly as pasted, e.g. `"10.2%"`.
    pub signal: String,
    pub distance: String,
    #[serde(default)]
    pub signal_strength: f64,
}

impl SignatureData {
    /// Subcategory when present, otherwise the category.
    pub fn effective_category(&self) -> &str {
        if self.subcategory.is_empty() {
            &self.category
        } else {
            &self.subcategory
        }
    }

    /// Field-wise overlay: every non-empty remembered field replaces the fresh one.
    pub fn overlaid_with(&self, remembered: &SignatureData) -> SignatureData {
        fn pick(remembered: &str, fresh: &str) -> String {
            if remembered.is_empty() {
                fresh.to_string()
            } else {
                remembered.to_string()
            }
        }

        let (signal, signal_strength) = if remembered.signal.is_empty() {
            (self.signal.clone(), self.signal_strength)
        } else {
            (remembered.signal.clone(), remembered.signal_strength)
        };

        SignatureData {
            id: self.id.clone(),
            category: pick(&remembered.category, &self.category),
            subcategory: pick(&remembered.subcategory, &self.subcategory),
            name: pick(&remembered.name, &self.name),
            signal,
            distance: pick(&remembered.distance, &self.distance),
            signal_strength,
        }
    }
}

/// Canonical in-memory shape of one known-signature entry.
///
/// `data` is `None` only for entries decoded from the legacy bare-timestamp
/// representation; they are upgraded the next time the identifier is observed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEntry {
    pub data: Option<SignatureData>,
    /// Last observation, epoch milliseconds.
    pub timestamp: i64,
}

impl StoreEntry {
    pub fn observed(data: SignatureData, timestamp: i64) -> Self {
        Self {
            data: Some(data),
            timestamp,
        }
    }

    pub fn is_expired(&self, now_ms: i64, expiration_ms: i64) -> bool {
        now_ms.saturating_sub(self.timestamp) >= expiration_ms
    }
}

/// On-disk shape of a known-signature entry. Older builds stored only the
/// last-seen timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedEntry {
    LegacyTimestamp(i64),
    Entry { data: SignatureData, timestamp: i64 },
}

impl From<PersistedEntry> for StoreEntry {
    fn from(entry: PersistedEntry) -> Self {
        match entry {
            PersistedEntry::LegacyTimestamp(timestamp) => StoreEntry {
                data: None,
                timestamp,
            },
            PersistedEntry::Entry { data, timestamp } => StoreEntry {
                data: Some(data),
                timestamp,
            },
        }
    }
}

impl From<&StoreEntry> for PersistedEntry {
    fn from(entry: &StoreEntry) -> Self {
        match &entry.data {
            Some(data) => PersistedEntry::Entry {
                data: data.clone(),
                timestamp: entry.timestamp,
            },
            None => PersistedEntry::LegacyTimestamp(entry.timestamp),
        }
    }
}

/// A reconciled record ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRecord {
    #[serde(flatten)]
    pub data: SignatureData,
    pub is_known: bool,
    pub is_favourited: bool,
    pub is_ignored: bool,
}

impl DisplayRecord {
    pub fn id(&self) -> &str {
        &self.data.id
    }
}
