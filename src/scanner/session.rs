use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::db::{read_json, write_json, KvStore};
use crate::log_info;
use crate::models::DisplayRecord;
use crate::scanner::{
    annotations::AnnotationTracker,
    known_store::{KnownSignatureStore, KnownSignatures},
    parser::parse_block,
    reconcile::{reconcile, ReconcileMode},
    view::{next_sort, project, SortConfig, SortKey},
};

const ENABLE_LOGS: bool = true;

pub const UNKNOWN_ONLY_FILTER_KEY: &str = "unknown-only-filter";

/// Single-user scanner state: persisted store and flags plus the active batch.
pub struct ScannerSession<S: KvStore> {
    kv: S,
    known: KnownSignatureStore,
    annotations: AnnotationTracker,
    batch: Vec<DisplayRecord>,
    sort: Option<SortConfig>,
    unknown_only: bool,
}

impl<S: KvStore> ScannerSession<S> {
    pub fn open(kv: S, known: KnownSignatureStore) -> Result<Self> {
        let annotations = AnnotationTracker::load(&kv)?;
        let unknown_only = read_json(&kv, UNKNOWN_ONLY_FILTER_KEY)?.unwrap_or(false);

        Ok(Self {
            kv,
            known,
            annotations,
            batch: Vec::new(),
            sort: None,
            unknown_only,
        })
    }

    /// Parses `text`, reconciles it and makes it the active batch.
    pub fn submit(
        &mut self,
        text: &str,
        mode: ReconcileMode,
        now: DateTime<Utc>,
    ) -> Result<&[DisplayRecord]> {
        let now_ms = now.timestamp_millis();
        let parsed = parse_block(text);
        let snapshot = self.known.load(&mut self.kv, now_ms)?;

        let outcome = reconcile(parsed, &snapshot, &self.annotations, mode, &self.batch, now_ms);
        self.known.save(&mut self.kv, &outcome.store)?;

        log_info!(
            "Reconciled {} signatures ({:?}): {} new, {} known",
            outcome.records.len(),
            mode,
            outcome.new_count(),
            outcome.records.len() - outcome.new_count()
        );

        self.batch = outcome.records;
        Ok(&self.batch)
    }

    pub fn toggle_favourite(&mut self, id: &str) -> Result<bool> {
        let favourited = self.annotations.toggle_favourite(&mut self.kv, id)?;
        for record in self.batch.iter_mut().filter(|r| r.id() == id) {
            record.is_favourited = favourited;
        }
        Ok(favourited)
    }

    pub fn toggle_ignored(&mut self, id: &str) -> Result<bool> {
        let ignored = self.annotations.toggle_ignored(&mut self.kv, id)?;
        for record in self.batch.iter_mut().filter(|r| r.id() == id) {
            record.is_ignored = ignored;
        }
        Ok(ignored)
    }

    /// Drops `id` from the active batch only. Returns whether anything was removed.
    pub fn remove_from_batch(&mut self, id: &str) -> bool {
        let before = self.batch.len();
        self.batch.retain(|r| r.id() != id);
        self.batch.len() != before
    }

    /// Forgets `id` everywhere: annotations, active batch and known store.
    pub fn remove_globally(&mut self, id: &str) -> Result<()> {
        self.annotations.forget(&mut self.kv, id)?;
        self.remove_from_batch(id);
        self.known.remove(&mut self.kv, id)?;
        log_info!("Removed signature {id} from all state");
        Ok(())
    }

    /// Deletes the known store, both annotation sets and the active batch.
    pub fn reset(&mut self) -> Result<()> {
        self.known.clear(&mut self.kv)?;
        self.annotations.clear(&mut self.kv)?;
        self.batch.clear();
        log_info!("Scanner state reset");
        Ok(())
    }

    pub fn set_unknown_only(&mut self, enabled: bool) -> Result<()> {
        write_json(&mut self.kv, UNKNOWN_ONLY_FILTER_KEY, &enabled)?;
        self.unknown_only = enabled;
        Ok(())
    }

    pub fn unknown_only(&self) -> bool {
        self.unknown_only
    }

    pub fn request_sort(&mut self, key: SortKey) -> Option<SortConfig> {
        self.sort = next_sort(self.sort, key);
        self.sort
    }

    pub fn set_sort(&mut self, sort: Option<SortConfig>) {
        self.sort = sort;
    }

    pub fn sort(&self) -> Option<SortConfig> {
        self.sort
    }

    pub fn batch(&self) -> &[DisplayRecord] {
        &self.batch
    }

    /// The active batch as it should be presented.
    pub fn view(&self) -> Vec<DisplayRecord> {
        project(&self.batch, self.sort, self.unknown_only)
    }

    /// Non-expired known signatures as of `now`.
    pub fn known_signatures(&mut self, now: DateTime<Utc>) -> Result<KnownSignatures> {
        self.known.load(&mut self.kv, now.timestamp_millis())
    }

    pub fn annotations(&self) -> &AnnotationTracker {
        &self.annotations
    }
}
