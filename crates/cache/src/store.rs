//! The per-cluster cache and its table lookup trait.

use crate::error::{CacheError, CacheResult};
use crate::table::{Index, Table};
use gwadmin_core::{
    Consumer, GlobalRule, PluginConfig, PluginMetadata, Reference, Resource, ResourceKind, Route,
    Schema, Ssl, StreamRoute, Upstream,
};
use parking_lot::RwLock;

/// All tables of one cluster.
#[derive(Debug, Default)]
pub struct Database {
    routes: Table<Route>,
    upstreams: Table<Upstream>,
    ssls: Table<Ssl>,
    stream_routes: Table<StreamRoute>,
    global_rules: Table<GlobalRule>,
    consumers: Table<Consumer>,
    plugin_configs: Table<PluginConfig>,
    schemas: Table<Schema>,
    plugin_metadata: Table<PluginMetadata>,
}

/// A resource kind with a table in [`Database`].
pub trait Cached: Resource {
    fn table(db: &Database) -> &Table<Self>;

    fn table_mut(db: &mut Database) -> &mut Table<Self>;

    /// Kind of a cached row still referencing `id`, if any.
    fn dependent(_db: &Database, _id: &str) -> Option<ResourceKind> {
        None
    }
}

macro_rules! cached {
    ($ty:ty, $field:ident) => {
        impl Cached for $ty {
            fn table(db: &Database) -> &Table<Self> {
                &db.$field
            }

            fn table_mut(db: &mut Database) -> &mut Table<Self> {
                &mut db.$field
            }
        }
    };
}

cached!(Route, routes);
cached!(Ssl, ssls);
cached!(StreamRoute, stream_routes);
cached!(GlobalRule, global_rules);
cached!(Consumer, consumers);
cached!(Schema, schemas);
cached!(PluginMetadata, plugin_metadata);

impl Cached for Upstream {
    fn table(db: &Database) -> &Table<Self> {
        &db.upstreams
    }

    fn table_mut(db: &mut Database) -> &mut Table<Self> {
        &mut db.upstreams
    }

    fn dependent(db: &Database, id: &str) -> Option<ResourceKind> {
        if db.routes.is_referenced(Reference::Upstream, id) {
            Some(ResourceKind::Route)
        } else if db.stream_routes.is_referenced(Reference::Upstream, id) {
            Some(ResourceKind::StreamRoute)
        } else {
            None
        }
    }
}

impl Cached for PluginConfig {
    fn table(db: &Database) -> &Table<Self> {
        &db.plugin_configs
    }

    fn table_mut(db: &mut Database) -> &mut Table<Self> {
        &mut db.plugin_configs
    }

    fn dependent(db: &Database, id: &str) -> Option<ResourceKind> {
        db.routes
            .is_referenced(Reference::PluginConfig, id)
            .then_some(ResourceKind::Route)
    }
}

/// In-memory cache for one cluster.
///
/// Every mutation runs under a single write lock, so a reader sees either
/// the state before or after it, never a partial write.
#[derive(Debug, Default)]
pub struct Cache {
    db: RwLock<Database>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `obj`.
    pub fn insert<T: Cached>(&self, obj: &T) -> CacheResult<()> {
        if obj.id().is_empty() {
            return Err(CacheError::MissingId(T::KIND));
        }
        let mut db = self.db.write();
        T::table_mut(&mut db).insert(obj.clone());
        Ok(())
    }

    /// Copy of the object with primary key `id`.
    pub fn get<T: Cached>(&self, id: &str) -> CacheResult<T> {
        let db = self.db.read();
        T::table(&db)
            .get(id)
            .cloned()
            .ok_or_else(|| not_found::<T>(id))
    }

    /// Copy of the object holding `name`.
    pub fn get_by_name<T: Cached>(&self, name: &str) -> CacheResult<T> {
        let db = self.db.read();
        T::table(&db)
            .get_by_name(name)
            .cloned()
            .ok_or_else(|| not_found::<T>(name))
    }

    /// Copies of the objects selected by `index`.
    pub fn list<T: Cached>(&self, index: Index<'_>) -> Vec<T> {
        let db = self.db.read();
        T::table(&db).list(index)
    }

    /// Fail with [`CacheError::StillInUse`] if a cached object references `obj`.
    pub fn check_references<T: Cached>(&self, obj: &T) -> CacheResult<()> {
        let db = self.db.read();
        check_dependents::<T>(&db, obj.id())
    }

    /// Remove `obj`, unless another cached object still references it.
    pub fn delete<T: Cached>(&self, obj: &T) -> CacheResult<()> {
        let mut db = self.db.write();
        check_dependents::<T>(&db, obj.id())?;
        T::table_mut(&mut db)
            .remove(obj.id())
            .map(|_| ())
            .ok_or_else(|| not_found::<T>(obj.id()))
    }

    /// Remove the row for `id` without checking for dependents.
    ///
    /// For mirroring a deletion the remote side has already applied.
    pub fn remove<T: Cached>(&self, id: &str) -> Option<T> {
        T::table_mut(&mut self.db.write()).remove(id)
    }

    pub fn len<T: Cached>(&self) -> usize {
        T::table(&self.db.read()).len()
    }
}

fn check_dependents<T: Cached>(db: &Database, id: &str) -> CacheResult<()> {
    match T::dependent(db, id) {
        Some(dependent) => Err(CacheError::StillInUse {
            kind: T::KIND,
            id: id.to_string(),
            dependent,
        }),
        None => Ok(()),
    }
}

fn not_found<T: Resource>(id: &str) -> CacheError {
    CacheError::NotFound {
        kind: T::KIND,
        id: id.to_string(),
    }
}
