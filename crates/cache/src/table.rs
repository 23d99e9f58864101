//! A single resource table and its secondary indexes.

use gwadmin_core::{OwnerRef, Reference, Resource};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Index selector for [`Cache::list`](crate::Cache::list).
#[derive(Clone, Copy, Debug)]
pub enum Index<'a> {
    /// Every row, in primary key order.
    All,
    /// The row holding this name, if any.
    Name(&'a str),
    /// Rows created for one Kubernetes object.
    Owner(&'a OwnerRef),
    /// Rows referencing this upstream ID.
    Upstream(&'a str),
    /// Rows referencing this plugin config ID.
    PluginConfig(&'a str),
}

/// Rows of one resource kind plus their secondary indexes.
///
/// Index maintenance happens on every insert and remove; no method performs
/// I/O and none can leave the indexes half updated.
#[derive(Debug)]
pub struct Table<T> {
    rows: BTreeMap<String, T>,
    names: HashMap<String, String>,
    owners: HashMap<String, BTreeSet<String>>,
    references: HashMap<(Reference, String), BTreeSet<String>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            names: HashMap::new(),
            owners: HashMap::new(),
            references: HashMap::new(),
        }
    }
}

impl<T: Resource> Table<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.rows.get(id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&T> {
        self.names.get(name).and_then(|id| self.rows.get(id))
    }

    /// Insert or replace the row with `obj`'s ID.
    ///
    /// A name already held by another row moves to `obj`; the older row
    /// stays reachable by ID only.
    pub(crate) fn insert(&mut self, obj: T) {
        let id = obj.id().to_string();
        if let Some(old) = self.rows.remove(&id) {
            self.unindex(&id, &old);
        }

        if let Some(name) = obj.name() {
            self.names.insert(name.to_string(), id.clone());
        }
        if let Some(owner) = obj.owner() {
            self.owners
                .entry(owner.index_key())
                .or_default()
                .insert(id.clone());
        }
        for (reference, target) in obj.references() {
            self.references
                .entry((reference, target.to_string()))
                .or_default()
                .insert(id.clone());
        }
        self.rows.insert(id, obj);
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<T> {
        let old = self.rows.remove(id)?;
        self.unindex(id, &old);
        Some(old)
    }

    /// Whether any row holds `reference` pointing at `target`.
    pub fn is_referenced(&self, reference: Reference, target: &str) -> bool {
        self.references
            .get(&(reference, target.to_string()))
            .is_some_and(|ids| !ids.is_empty())
    }

    /// Copies of the rows selected by `index`.
    pub fn list(&self, index: Index<'_>) -> Vec<T> {
        match index {
            Index::All => self.rows.values().cloned().collect(),
            Index::Name(name) => self.get_by_name(name).cloned().into_iter().collect(),
            Index::Owner(owner) => self.collect(self.owners.get(&owner.index_key())),
            Index::Upstream(target) => self.collect(
                self.references
                    .get(&(Reference::Upstream, target.to_string())),
            ),
            Index::PluginConfig(target) => self.collect(
                self.references
                    .get(&(Reference::PluginConfig, target.to_string())),
            ),
        }
    }

    fn collect(&self, ids: Option<&BTreeSet<String>>) -> Vec<T> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.rows.get(id).cloned())
            .collect()
    }

    fn unindex(&mut self, id: &str, old: &T) {
        if let Some(name) = old.name()
            && self.names.get(name).is_some_and(|holder| holder == id)
        {
            self.names.remove(name);
        }
        if let Some(owner) = old.owner() {
            remove_from(&mut self.owners, owner.index_key(), id);
        }
        for (reference, target) in old.references() {
            remove_from(&mut self.references, (reference, target.to_string()), id);
        }
    }
}

fn remove_from<K: std::hash::Hash + Eq>(
    index: &mut HashMap<K, BTreeSet<String>>,
    key: K,
    id: &str,
) {
    if let Some(ids) = index.get_mut(&key) {
        ids.remove(id);
        if ids.is_empty() {
            index.remove(&key);
        }
    }
}
