use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::DisplayRecord;
use crate::scanner::parser::distance_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Id,
    Status,
    Category,
    Name,
    Signal,
    Distance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Descending,
        }
    }
}

/// Next sort state after the user picks `key`:
/// unsorted -> ascending -> descending -> unsorted.
pub fn next_sort(current: Option<SortConfig>, key: SortKey) -> Option<SortConfig> {
    match current {
        Some(config) if config.key == key => match config.direction {
            SortDirection::Ascending => Some(SortConfig::descending(key)),
            SortDirection::Descending => None,
        },
        _ => Some(SortConfig::ascending(key)),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_by(key: SortKey, a: &DisplayRecord, b: &DisplayRecord) -> Ordering {
    match key {
        SortKey::Id => compare_text(&a.data.id, &b.data.id),
        SortKey::Status => a.is_known.cmp(&b.is_known),
        SortKey::Category => {
            compare_text(a.data.effective_category(), b.data.effective_category())
        }
        SortKey::Name => compare_text(&a.data.name, &b.data.name),
        SortKey::Signal => a.data.signal_strength.total_cmp(&b.data.signal_strength),
        SortKey::Distance => {
            distance_value(&a.data.distance).total_cmp(&distance_value(&b.data.distance))
        }
    }
}

/// Sorted, filtered copy of `records`. Ties keep batch order.
pub fn project(
    records: &[DisplayRecord],
    sort: Option<SortConfig>,
    unknown_only: bool,
) -> Vec<DisplayRecord> {
    let mut projected: Vec<DisplayRecord> = records
        .iter()
        .filter(|record| !unknown_only || !record.is_known)
        .cloned()
        .collect();

    if let Some(config) = sort {
        projected.sort_by(|a, b| {
            let ordering = compare_by(config.key, a, b);
            match config.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SignatureData;

    fn record(id: &str, category: &str, subcategory: &str, name: &str, strength: f64, distance: &str, known: bool) -> DisplayRecord {
        DisplayRecord {
            data: SignatureData {
                id: id.into(),
                category: category.into(),
                subcategory: subcategory.into(),
                name: name.into(),
                signal: format!("{strength}%"),
                distance: distance.into(),
                signal_strength: strength,
            },
            is_known: known,
            is_favourited: false,
            is_ignored: false,
        }
    }

    fn sample() -> Vec<DisplayRecord> {
        vec![
            record("IVW-652", "Cosmic Signature", "", "", 0.0, "34.37 AU", false),
            record("llx-689", "Cosmic Signature", "Combat Site", "Amarr Rendezvous Point", 100.0, "15.77 AU", true),
            record("OQW-108", "Cosmic Signature", "", "", 10.2, "14.80 AU", false),
            record("NXJ-579", "Cosmic Anomaly", "Ore Site", "medium Jaspet Deposit", 100.0, "4.22 AU", true),
        ]
    }

    fn ids(records: &[DisplayRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn no_sort_keeps_batch_order() {
        let records = sample();
        assert_eq!(ids(&project(&records, None, false)), ["IVW-652", "llx-689", "OQW-108", "NXJ-579"]);
    }

    #[test]
    fn signal_descending() {
        let records = vec![
            record("A", "", "", "", 0.0, "", false),
            record("B", "", "", "", 100.0, "", false),
            record("C", "", "", "", 10.2, "", false),
        ];
        let sorted = project(&records, Some(SortConfig::descending(SortKey::Signal)), false);
        let strengths: Vec<f64> = sorted.iter().map(|r| r.data.signal_strength).collect();
        assert_eq!(strengths, [100.0, 10.2, 0.0]);
    }

    #[test]
    fn id_sort_ignores_case() {
        let sorted = project(&sample(), Some(SortConfig::ascending(SortKey::Id)), false);
        assert_eq!(ids(&sorted), ["IVW-652", "llx-689", "NXJ-579", "OQW-108"]);
    }

    #[test]
    fn status_puts_new_first_and_keeps_ties_stable() {
        let sorted = project(&sample(), Some(SortConfig::ascending(SortKey::Status)), false);
        assert_eq!(ids(&sorted), ["IVW-652", "OQW-108", "llx-689", "NXJ-579"]);
    }

    #[test]
    fn category_uses_subcategory_when_present() {
        let sorted = project(&sample(), Some(SortConfig::ascending(SortKey::Category)), false);
        assert_eq!(ids(&sorted), ["llx-689", "IVW-652", "OQW-108", "NXJ-579"]);
    }

    #[test]
    fn name_sort_ignores_case() {
        let sorted = project(&sample(), Some(SortConfig::descending(SortKey::Name)), false);
        assert_eq!(ids(&sorted), ["NXJ-579", "llx-689", "IVW-652", "OQW-108"]);
    }

    #[test]
    fn distance_sort_is_numeric() {
        let sorted = project(&sample(), Some(SortConfig::ascending(SortKey::Distance)), false);
        assert_eq!(ids(&sorted), ["NXJ-579", "OQW-108", "llx-689", "IVW-652"]);
    }

    #[test]
    fn unknown_only_hides_known_without_touching_input() {
        let records = sample();
        let projected = project(&records, Some(SortConfig::descending(SortKey::Signal)), true);
        assert_eq!(ids(&projected), ["OQW-108", "IVW-652"]);
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn sort_cycles_through_directions() {
        let first = next_sort(None, SortKey::Name);
        assert_eq!(first, Some(SortConfig::ascending(SortKey::Name)));
        let second = next_sort(first, SortKey::Name);
        assert_eq!(second, Some(SortConfig::descending(SortKey::Name)));
        assert_eq!(next_sort(second, SortKey::Name), None);
        assert_eq!(next_sort(second, SortKey::Id), Some(SortConfig::ascending(SortKey::Id)));
    }
}
