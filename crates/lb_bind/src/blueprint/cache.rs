use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::hash::Hash;
use std::sync::{PoisonError, RwLock};

use lb_utils::BoundedMap;

use crate::introspect::{Direction, ObjectDefinition};
use crate::locate::{DispatchTag, ValueReader, ValueWriter};
use crate::types::ResolvedType;

/// A bounded map shared between threads, cleared as a whole when full.
pub(crate) struct SharedCache<K, V> {
    name: &'static str,
    map: RwLock<BoundedMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> SharedCache<K, V> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            map: RwLock::new(BoundedMap::new(capacity)),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn insert(&self, key: K, value: V) {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        if map.insert(key, value) {
            log::debug!("{} cache reached {} entries and was cleared", self.name, map.capacity());
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[cfg(test)]
    pub fn clear(&self) {
        self.map.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// The caches owned by one blueprint.
pub(crate) struct Caches {
    pub tags: SharedCache<ResolvedType, DispatchTag>,
    pub readers: SharedCache<ResolvedType, ValueReader>,
    pub writers: SharedCache<ResolvedType, ValueWriter>,
    pub definitions: SharedCache<(Cow<'static, str>, Direction), Arc<ObjectDefinition>>,
}

impl Caches {
    pub fn new(capacity: usize) -> Self {
        Self {
            tags: SharedCache::new("dispatch tag", capacity),
            readers: SharedCache::new("reader", capacity),
            writers: SharedCache::new("writer", capacity),
            definitions: SharedCache::new("definition", capacity),
        }
    }
}
