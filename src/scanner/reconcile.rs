use std::collections::HashMap;

use crate::models::{DisplayRecord, SignatureData, StoreEntry};
use crate::scanner::annotations::AnnotationTracker;
use crate::scanner::known_store::KnownSignatures;

/// How novelty is decided for a freshly parsed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// Known iff the identifier is in the store. Display prefers the
    /// remembered best reading.
    #[default]
    Check,
    /// Known status is carried over from the previous batch; fresh fields are
    /// shown as parsed.
    Refresh,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub store: KnownSignatures,
    pub records: Vec<DisplayRecord>,
}

impl Reconciliation {
    pub fn new_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_known).count()
    }
}

/// Merges one observation into an existing entry, keeping the strongest
/// reading and always advancing the timestamp.
pub fn merge_observation(
    prior: Option<&StoreEntry>,
    observed: &SignatureData,
    now_ms: i64,
) -> StoreEntry {
    match prior.and_then(|entry| entry.data.as_ref()) {
        Some(remembered) if observed.signal_strength < remembered.signal_strength => {
            StoreEntry::observed(remembered.clone(), now_ms)
        }
        _ => StoreEntry::observed(observed.clone(), now_ms),
    }
}

/// Reconciles `batch` against the pre-batch `snapshot` of the known store.
///
/// `previous` is only consulted in [`ReconcileMode::Refresh`].
pub fn reconcile(
    batch: Vec<SignatureData>,
    snapshot: &KnownSignatures,
    annotations: &AnnotationTracker,
    mode: ReconcileMode,
    previous: &[DisplayRecord],
    now_ms: i64,
) -> Reconciliation {
    let previous_known: HashMap<&str, bool> = match mode {
        ReconcileMode::Refresh => previous.iter().map(|r| (r.id(), r.is_known)).collect(),
        ReconcileMode::Check => HashMap::new(),
    };

    let mut store = snapshot.clone();
    let mut records = Vec::with_capacity(batch.len());

    for parsed in batch {
        let prior = snapshot.get(&parsed.id);

        let is_known = match mode {
            ReconcileMode::Check => prior.is_some(),
            ReconcileMode::Refresh => previous_known
                .get(parsed.id.as_str())
                .copied()
                .unwrap_or(false),
        };

        // Duplicates within one batch fold into the working map, so the
        // strongest reading still wins.
        let merged = merge_observation(store.get(&parsed.id), &parsed, now_ms);

        let shown = match (mode, is_known, merged.data.as_ref()) {
            (ReconcileMode::Check, true, Some(remembered)) => parsed.overlaid_with(remembered),
            _ => parsed,
        };

        store.insert(shown.id.clone(), merged);

        records.push(DisplayRecord {
            is_known,
            is_favourited: annotations.is_favourited(&shown.id),
            is_ignored: annotations.is_ignored(&shown.id),
            data: shown,
        });
    }

    Reconciliation { store, records }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::scanner::parser::parse_block;

    const NOW: i64 = 1_760_000_000_000;

    fn sig(id: &str, name: &str, strength: f64) -> SignatureData {
        SignatureData {
            id: id.into(),
            category: "Cosmic Signature".into(),
            subcategory: String::new(),
            name: name.into(),
            signal: format!("{strength:.1}%"),
            distance: "10.00 AU".into(),
            signal_strength: strength,
        }
    }

    fn no_annotations() -> AnnotationTracker {
        let db = Database::open_in_memory().unwrap();
        AnnotationTracker::load(&db).unwrap()
    }

    fn check(batch: Vec<SignatureData>, snapshot: &KnownSignatures, now: i64) -> Reconciliation {
        reconcile(batch, snapshot, &no_annotations(), ReconcileMode::Check, &[], now)
    }

    #[test]
    fn first_pass_is_new_second_pass_is_known() {
        let batch = parse_block("AAA-111\tCosmic Signature\t\t\t0.0%\t10.00 AU");

        let first = check(batch.clone(), &KnownSignatures::new(), NOW);
        assert_eq!(first.records.len(), 1);
        assert!(!first.records[0].is_known);
        assert_eq!(first.records[0].data.signal_strength, 0.0);
        assert_eq!(first.new_count(), 1);

        let second = check(batch, &first.store, NOW + 1);
        assert!(second.records[0].is_known);
        assert_eq!(second.new_count(), 0);
    }

    #[test]
    fn weaker_reading_keeps_data_but_advances_timestamp() {
        let mut snapshot = KnownSignatures::new();
        snapshot.insert("AAA-111".into(), StoreEntry::observed(sig("AAA-111", "Relic Site", 80.0), NOW - 500));

        let result = check(vec![sig("AAA-111", "", 60.0)], &snapshot, NOW);
        let entry = &result.store["AAA-111"];
        assert_eq!(entry.timestamp, NOW);
        assert_eq!(entry.data.as_ref().unwrap().signal_strength, 80.0);
        assert_eq!(entry.data.as_ref().unwrap().name, "Relic Site");

        let shown = &result.records[0].data;
        assert_eq!(shown.signal_strength, 80.0);
        assert_eq!(shown.name, "Relic Site");
    }

    #[test]
    fn stronger_or_equal_reading_replaces_data() {
        let mut snapshot = KnownSignatures::new();
        snapshot.insert("AAA-111".into(), StoreEntry::observed(sig("AAA-111", "", 80.0), NOW - 500));

        let result = check(vec![sig("AAA-111", "Data Site", 95.0)], &snapshot, NOW);
        let data = result.store["AAA-111"].data.as_ref().unwrap();
        assert_eq!(data.signal_strength, 95.0);
        assert_eq!(data.name, "Data Site");

        let result = check(vec![sig("AAA-111", "Other", 80.0)], &snapshot, NOW);
        assert_eq!(result.store["AAA-111"].data.as_ref().unwrap().name, "Other");
    }

    #[test]
    fn legacy_entry_counts_as_known_and_is_upgraded() {
        let mut snapshot = KnownSignatures::new();
        snapshot.insert("AAA-111".into(), StoreEntry { data: None, timestamp: NOW - 10 });

        let result = check(vec![sig("AAA-111", "Gas Site", 20.0)], &snapshot, NOW);
        assert!(result.records[0].is_known);
        assert_eq!(result.records[0].data.name, "Gas Site");
        assert_eq!(result.store["AAA-111"], StoreEntry::observed(sig("AAA-111", "Gas Site", 20.0), NOW));
    }

    #[test]
    fn batch_sees_only_the_pre_batch_snapshot() {
        let batch = vec![sig("AAA-111", "", 10.0), sig("AAA-111", "", 5.0)];
        let result = check(batch, &KnownSignatures::new(), NOW);

        assert!(result.records.iter().all(|r| !r.is_known));
        assert_eq!(result.store["AAA-111"].data.as_ref().unwrap().signal_strength, 10.0);
    }

    #[test]
    fn untouched_entries_are_carried_over() {
        let mut snapshot = KnownSignatures::new();
        snapshot.insert("BBB-222".into(), StoreEntry::observed(sig("BBB-222", "", 1.0), NOW - 5));

        let result = check(vec![sig("AAA-111", "", 1.0)], &snapshot, NOW);
        assert_eq!(result.store["BBB-222"].timestamp, NOW - 5);
        assert_eq!(result.store.len(), 2);
    }

    #[test]
    fn refresh_carries_known_state_from_previous_batch() {
        let mut snapshot = KnownSignatures::new();
        snapshot.insert("AAA-111".into(), StoreEntry::observed(sig("AAA-111", "Remembered", 90.0), NOW - 5));
        snapshot.insert("BBB-222".into(), StoreEntry::observed(sig("BBB-222", "", 90.0), NOW - 5));

        let previous = vec![
            DisplayRecord { data: sig("AAA-111", "", 10.0), is_known: false, is_favourited: false, is_ignored: false },
            DisplayRecord { data: sig("CCC-333", "", 10.0), is_known: true, is_favourited: false, is_ignored: false },
        ];
        let batch = vec![sig("AAA-111", "", 40.0), sig("BBB-222", "", 40.0), sig("CCC-333", "", 40.0)];

        let result = reconcile(batch, &snapshot, &no_annotations(), ReconcileMode::Refresh, &previous, NOW);
        let known: Vec<bool> = result.records.iter().map(|r| r.is_known).collect();
        assert_eq!(known, [false, false, true]);

        // Display shows the fresh parse, the store still merges.
        assert_eq!(result.records[0].data.signal_strength, 40.0);
        assert_eq!(result.records[0].data.name, "");
        let stored = result.store["AAA-111"].data.as_ref().unwrap();
        assert_eq!(stored.name, "Remembered");
        assert_eq!(stored.signal_strength, 90.0);
        assert_eq!(result.store["AAA-111"].timestamp, NOW);
        assert_eq!(result.store["CCC-333"].data.as_ref().unwrap().signal_strength, 40.0);
    }

    #[test]
    fn annotation_flags_are_read_live() {
        let mut db = Database::open_in_memory().unwrap();
        let mut annotations = AnnotationTracker::load(&db).unwrap();
        annotations.toggle_favourite(&mut db, "AAA-111").unwrap();
        annotations.toggle_ignored(&mut db, "BBB-222").unwrap();

        let batch = vec![sig("AAA-111", "", 1.0), sig("BBB-222", "", 1.0)];
        let result = reconcile(batch, &KnownSignatures::new(), &annotations, ReconcileMode::Check, &[], NOW);

        assert!(result.records[0].is_favourited && !result.records[0].is_ignored);
        assert!(!result.records[1].is_favourited && result.records[1].is_ignored);
    }
}
