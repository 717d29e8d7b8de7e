use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use super::{ValueRead, ValueWrite};
use crate::types::ResolvedType;

// -----------------------------------------------------------------------------
// Provider

/// Supplies custom handlers for whole types.
///
/// Every method defaults to `None`, meaning "not mine, ask the next one".
/// Collection and map hooks are asked only for types the engine would
/// otherwise read as a collection or a map, and are given the element types
/// it found.
pub trait Provider: Send + Sync + 'static {
    fn find_reader(&self, ty: &ResolvedType) -> Option<Arc<dyn ValueRead>> {
        let _ = ty;
        None
    }

    fn find_writer(&self, ty: &ResolvedType) -> Option<Arc<dyn ValueWrite>> {
        let _ = ty;
        None
    }

    fn find_collection_reader(
        &self,
        ty: &ResolvedType,
        element: &ResolvedType,
    ) -> Option<Arc<dyn ValueRead>> {
        let _ = (ty, element);
        None
    }

    fn find_map_reader(
        &self,
        ty: &ResolvedType,
        key: &ResolvedType,
        value: &ResolvedType,
    ) -> Option<Arc<dyn ValueRead>> {
        let _ = (ty, key, value);
        None
    }
}

// -----------------------------------------------------------------------------
// ProviderChain

/// An ordered list of providers; the first `Some` wins.
///
/// # Examples
///
/// ```
/// use lb_bind::ext::{Provider, ProviderChain};
///
/// struct Nothing;
/// impl Provider for Nothing {}
///
/// let second = ProviderChain::from_provider(Nothing);
/// let combined = ProviderChain::combine(None, second.clone());
/// assert_eq!(combined.len(), second.len());
///
/// let both = ProviderChain::combine(Some(combined), second);
/// assert_eq!(both.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct ProviderChain {
    entries: Vec<Arc<dyn Provider>>,
}

impl ProviderChain {
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn from_provider(provider: impl Provider) -> Self {
        Self {
            entries: alloc::vec![Arc::new(provider) as Arc<dyn Provider>],
        }
    }

    /// Chains `first` before `second`, flattening both.
    ///
    /// Without `first`, this is `second` itself.
    pub fn combine(first: Option<ProviderChain>, second: ProviderChain) -> ProviderChain {
        match first {
            None => second,
            Some(mut first) => {
                first.entries.extend(second.entries);
                first
            }
        }
    }

    /// Adds a provider with the highest precedence.
    #[inline]
    pub fn insert(&mut self, provider: Arc<dyn Provider>) {
        self.entries.insert(0, provider);
    }

    /// Adds a provider with the lowest precedence.
    #[inline]
    pub fn append(&mut self, provider: Arc<dyn Provider>) {
        self.entries.push(provider);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Provider for ProviderChain {
    fn find_reader(&self, ty: &ResolvedType) -> Option<Arc<dyn ValueRead>> {
        self.entries.iter().find_map(|p| p.find_reader(ty))
    }

    fn find_writer(&self, ty: &ResolvedType) -> Option<Arc<dyn ValueWrite>> {
        self.entries.iter().find_map(|p| p.find_writer(ty))
    }

    fn find_collection_reader(
        &self,
        ty: &ResolvedType,
        element: &ResolvedType,
    ) -> Option<Arc<dyn ValueRead>> {
        self.entries
            .iter()
            .find_map(|p| p.find_collection_reader(ty, element))
    }

    fn find_map_reader(
        &self,
        ty: &ResolvedType,
        key: &ResolvedType,
        value: &ResolvedType,
    ) -> Option<Arc<dyn ValueRead>> {
        self.entries
            .iter()
            .find_map(|p| p.find_map_reader(ty, key, value))
    }
}

impl fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderChain")
            .field("len", &self.entries.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::{Provider, ProviderChain};
    use crate::class::ClassRegistry;
    use crate::error::BindError;
    use crate::ext::{ValueWrite, WriteContext};
    use crate::types::{ResolvedType, TypeResolver};
    use crate::value::Value;

    struct Fixed;

    impl ValueWrite for Fixed {
        fn write<'v>(
            &self,
            _cx: &WriteContext<'_>,
            _ty: &ResolvedType,
            _value: Value<'v>,
        ) -> Result<Value<'v>, BindError> {
            Ok(Value::Null)
        }
    }

    /// Answers for one class only and counts the answers it gave.
    struct For(&'static str, Arc<AtomicUsize>);

    impl Provider for For {
        fn find_writer(&self, ty: &ResolvedType) -> Option<Arc<dyn ValueWrite>> {
            if ty.class_name() != self.0 {
                return None;
            }
            self.1.fetch_add(1, Ordering::Relaxed);
            Some(Arc::new(Fixed))
        }
    }

    fn resolve(name: &str) -> ResolvedType {
        TypeResolver::new(Arc::new(ClassRegistry::new()))
            .resolve_class(name)
            .unwrap()
    }

    #[test]
    fn first_answer_wins() {
        let (early, late) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let mut chain = ProviderChain::new();
        chain.append(Arc::new(For("String", late.clone())));
        chain.insert(Arc::new(For("String", early.clone())));

        assert!(chain.find_writer(&resolve("String")).is_some());
        assert!(chain.find_writer(&resolve("i32")).is_none());
        assert_eq!(early.load(Ordering::Relaxed), 1);
        assert_eq!(late.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn combine_without_first_is_second() {
        let hits = Arc::new(AtomicUsize::new(0));
        let second = ProviderChain::from_provider(For("String", hits.clone()));
        let combined = ProviderChain::combine(None, second.clone());
        assert_eq!(combined.len(), 1);
        assert!(combined.find_writer(&resolve("String")).is_some());
        assert!(second.find_writer(&resolve("String")).is_some());
        assert_eq!(hits.load(Ordering::Relaxed), 2);

        let other = Arc::new(AtomicUsize::new(0));
        let first = ProviderChain::from_provider(For("i32", other.clone()));
        let both = ProviderChain::combine(Some(first), second.clone());
        assert_eq!(both.len(), 2);
        assert!(both.find_writer(&resolve("String")).is_some());
        assert!(both.find_writer(&resolve("i32")).is_some());
        assert!(both.find_writer(&resolve("bool")).is_none());
        assert_eq!(other.load(Ordering::Relaxed), 1);
        assert_eq!(hits.load(Ordering::Relaxed), 3);

        // A first chain answering the same class hides the second one.
        let shadow = Arc::new(AtomicUsize::new(0));
        let first = ProviderChain::from_provider(For("String", shadow.clone()));
        let shadowed = ProviderChain::combine(Some(first), second);
        assert!(shadowed.find_writer(&resolve("String")).is_some());
        assert!(shadowed.find_writer(&resolve("bool")).is_none());
        assert_eq!(shadow.load(Ordering::Relaxed), 1);
        assert_eq!(hits.load(Ordering::Relaxed), 3);
    }
}
