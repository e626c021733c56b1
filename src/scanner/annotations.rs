use std::collections::BTreeSet;

use anyhow::Result;

use crate::db::{read_json, write_json, KvStore};

pub const FAVOURITED_SIGNATURES_KEY: &str = "favourited-signatures";
pub const IGNORED_SIGNATURES_KEY: &str = "ignored-signatures";

/// A persisted set of signature identifiers, stored as a JSON array.
#[derive(Debug, Clone)]
pub struct AnnotationSet {
    key: &'static str,
    ids: BTreeSet<String>,
}

impl AnnotationSet {
    pub fn load(kv: &dyn KvStore, key: &'static str) -> Result<Self> {
        let ids: Vec<String> = read_json(kv, key)?.unwrap_or_default();
        Ok(Self {
            key,
            ids: ids.into_iter().collect(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Adds `id` if absent, removes it otherwise. Returns membership afterwards.
    pub fn toggle(&mut self, kv: &mut dyn KvStore, id: &str) -> Result<bool> {
        let present = if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        };
        self.persist(kv)?;
        Ok(present)
    }

    pub fn remove(&mut self, kv: &mut dyn KvStore, id: &str) -> Result<()> {
        if self.ids.remove(id) {
            self.persist(kv)?;
        }
        Ok(())
    }

    pub fn clear(&mut self, kv: &mut dyn KvStore) -> Result<()> {
        self.ids.clear();
        kv.delete(self.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    fn persist(&self, kv: &mut dyn KvStore) -> Result<()> {
        let ids: Vec<&str> = self.iter().collect();
        write_json(kv, self.key, &ids)
    }
}

/// Favourite and ignore flags, independent of reconciliation.
#[derive(Debug, Clone)]
pub struct AnnotationTracker {
    favourites: AnnotationSet,
    ignored: AnnotationSet,
}

impl AnnotationTracker {
    pub fn load(kv: &dyn KvStore) -> Result<Self> {
        Ok(Self {
            favourites: AnnotationSet::load(kv, FAVOURITED_SIGNATURES_KEY)?,
            ignored: AnnotationSet::load(kv, IGNORED_SIGNATURES_KEY)?,
        })
    }

    pub fn is_favourited(&self, id: &str) -> bool {
        self.favourites.contains(id)
    }

    pub fn is_ignored(&self, id: &str) -> bool {
        self.ignored.contains(id)
    }

    pub fn toggle_favourite(&mut self, kv: &mut dyn KvStore, id: &str) -> Result<bool> {
        self.favourites.toggle(kv, id)
    }

    pub fn toggle_ignored(&mut self, kv: &mut dyn KvStore, id: &str) -> Result<bool> {
        self.ignored.toggle(kv, id)
    }

    /// Drops `id` from both sets.
    pub fn forget(&mut self, kv: &mut dyn KvStore, id: &str) -> Result<()> {
        self.favourites.remove(kv, id)?;
        self.ignored.remove(kv, id)
    }

    pub fn clear(&mut self, kv: &mut dyn KvStore) -> Result<()> {
        self.favourites.clear(kv)?;
        self.ignored.clear(kv)
    }

    pub fn favourites(&self) -> &AnnotationSet {
        &self.favourites
    }
}
