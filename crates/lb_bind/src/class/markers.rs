use alloc::borrow::Cow;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use lb_utils::TypeIdMap;

// -----------------------------------------------------------------------------
// Markers

/// Typed metadata attached to a class or a member, at most one per type.
///
/// The engine never reads markers on its own; a
/// [`MetadataSource`](crate::introspect::MetadataSource) decides whether
/// they apply.
///
/// # Examples
///
/// ```
/// use lb_bind::class::{Ignore, Markers, Rename};
///
/// let markers = Markers::new().with(Rename::to("b"));
/// assert_eq!(markers.get::<Rename>().unwrap().name(), "b");
/// assert!(!markers.contains::<Ignore>());
/// ```
#[derive(Clone, Default)]
pub struct Markers(TypeIdMap<Arc<dyn Any + Send + Sync>>);

impl Markers {
    #[inline]
    pub const fn new() -> Self {
        Self(TypeIdMap::new())
    }

    /// Adds a marker, replacing one of the same type.
    #[inline]
    pub fn with<M: Any + Send + Sync>(mut self, marker: M) -> Self {
        self.insert(marker);
        self
    }

    #[inline]
    pub fn insert<M: Any + Send + Sync>(&mut self, marker: M) {
        self.0.insert(TypeId::of::<M>(), Arc::new(marker));
    }

    pub fn get<M: Any>(&self) -> Option<&M> {
        self.0.get_type::<M>().and_then(|m| m.downcast_ref::<M>())
    }

    #[inline]
    pub fn contains<M: Any>(&self) -> bool {
        self.0.contains_type::<M>()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `self` overlaid with `other`; markers in `other` win.
    pub fn overlaid(&self, other: &Markers) -> Markers {
        let mut merged = self.clone();
        for (type_id, marker) in other.0.iter() {
            merged.0.insert(*type_id, marker.clone());
        }
        merged
    }
}

impl fmt::Debug for Markers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Markers({})", self.0.len())
    }
}

// -----------------------------------------------------------------------------
// Built-in markers

/// Excludes a member from binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ignore;

/// Binds a member under an explicit name.
///
/// An empty name keeps the implicit one and only forces visibility,
/// like [`Include`].
#[derive(Debug, Clone)]
pub struct Rename(pub Cow<'static, str>);

impl Rename {
    #[inline]
    pub fn to(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Forces a member to be visible under its implicit name.
#[derive(Debug, Clone, Copy, Default)]
pub struct Include;

/// Extra names accepted for a member when reading.
#[derive(Debug, Clone, Default)]
pub struct Alias(pub Vec<Cow<'static, str>>);

impl Alias {
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}

/// Class-level: the names to put first when writing, in this order.
#[derive(Debug, Clone, Default)]
pub struct PropertyOrder(pub Vec<Cow<'static, str>>);

impl PropertyOrder {
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}

/// Class-level: property names to drop and to skip silently when reading.
#[derive(Debug, Clone, Default)]
pub struct IgnoreProperties(pub Vec<Cow<'static, str>>);

impl IgnoreProperties {
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Ignore, Include, Markers, Rename};

    #[test]
    fn overlay_prefers_the_overlay() {
        let declared = Markers::new().with(Rename::to("a")).with(Include);
        let overrides = Markers::new().with(Rename::to("b")).with(Ignore);
        let merged = declared.overlaid(&overrides);
        assert_eq!(merged.get::<Rename>().unwrap().name(), "b");
        assert!(merged.contains::<Include>());
        assert!(merged.contains::<Ignore>());
        assert_eq!(merged.len(), 3);
        assert_eq!(declared.len(), 2);
    }
}
