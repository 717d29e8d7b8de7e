use core::borrow::Borrow;
use core::fmt::{self, Debug};
use core::hash::Hash;

use crate::hash::HashMap;

// -----------------------------------------------------------------------------
// BoundedMap

/// A map holding at most `capacity` entries.
///
/// Inserting a new key into a full map clears the whole map first. There is
/// no recency tracking: a miss only costs recomputing the value, so the map
/// trades hit rate for a trivial eviction policy.
///
/// # Examples
///
/// ```
/// use lb_utils::BoundedMap;
///
/// let mut map = BoundedMap::new(2);
/// assert!(!map.insert("a", 1));
/// assert!(!map.insert("b", 2));
/// // Full: the next new key clears everything.
/// assert!(map.insert("c", 3));
/// assert_eq!(map.len(), 1);
/// assert_eq!(map.get("c"), Some(&3));
/// ```
pub struct BoundedMap<K, V> {
    map: HashMap<K, V>,
    capacity: usize,
}

impl<K: Eq + Hash, V> BoundedMap<K, V> {
    /// Creates an empty map bounded to `capacity` entries.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::default(),
            capacity: capacity.max(1),
        }
    }

    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        self.map.get(key)
    }

    /// Inserts an entry and returns `true` if the map had to be cleared.
    ///
    /// Replacing the value of an existing key never clears the map.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let cleared = if self.map.len() >= self.capacity && !self.map.contains_key(&key) {
            self.map.clear();
            true
        } else {
            false
        };
        self.map.insert(key, value);
        cleared
    }

    #[inline]
    pub fn clear(&mut self) {
        self.map.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K: Debug, V: Debug> Debug for BoundedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedMap")
            .field("capacity", &self.capacity)
            .field("entries", &self.map)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::BoundedMap;

    #[test]
    fn replacing_a_key_never_clears() {
        let mut map = BoundedMap::new(2);
        map.insert(1, "a");
        map.insert(2, "b");
        assert!(!map.insert(2, "c"));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&2), Some(&"c"));
    }

    #[test]
    fn overflow_clears_everything() {
        let mut map = BoundedMap::new(3);
        for i in 0..3 {
            assert!(!map.insert(i, i));
        }
        assert!(map.insert(10, 10));
        assert_eq!(map.len(), 1);
        assert!(map.get(&0).is_none());
    }

    #[test]
    fn zero_capacity_is_one() {
        let mut map = BoundedMap::new(0);
        assert_eq!(map.capacity(), 1);
        assert!(!map.insert("x", 1));
        assert!(map.insert("y", 2));
    }
}
