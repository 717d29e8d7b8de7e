use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

use super::{ResolvedType, TypeVariable};
use crate::error::BindError;

// -----------------------------------------------------------------------------
// TypeBindings

/// The type arguments bound to one class's declared type parameters.
///
/// Bindings are ordered by parameter position. They also carry the names of
/// variables being resolved as unbound in the current resolution, which stops
/// recursive bounds such as `T extends Comparable<T>` from looping.
///
/// Equality and hashing only consider names and types.
#[derive(Clone, Default)]
pub struct TypeBindings {
    names: Vec<Cow<'static, str>>,
    types: Vec<ResolvedType>,
    unbound: Vec<Cow<'static, str>>,
}

impl TypeBindings {
    /// Bindings with no parameters.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            names: Vec::new(),
            types: Vec::new(),
            unbound: Vec::new(),
        }
    }

    /// Binds `types` to the parameters of `class` by position.
    pub fn create(
        class: &str,
        params: &[TypeVariable],
        types: Vec<ResolvedType>,
    ) -> Result<Self, BindError> {
        if params.len() != types.len() {
            return Err(BindError::TypeArity {
                class: class.into(),
                expected: params.len(),
                found: types.len(),
            });
        }
        Ok(Self {
            names: params.iter().map(|p| p.name.clone()).collect(),
            types,
            unbound: Vec::new(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns the type bound at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&ResolvedType> {
        self.types.get(index)
    }

    /// Returns the type bound to the parameter called `name`.
    pub fn find(&self, name: &str) -> Option<&ResolvedType> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|index| &self.types[index])
    }

    #[inline]
    pub fn names(&self) -> &[Cow<'static, str>] {
        &self.names
    }

    #[inline]
    pub fn types(&self) -> &[ResolvedType] {
        &self.types
    }

    /// Returns a copy that marks `name` as currently unbound.
    pub fn with_unbound(&self, name: Cow<'static, str>) -> Self {
        let mut unbound = self.unbound.clone();
        unbound.push(name);
        Self {
            names: self.names.clone(),
            types: self.types.clone(),
            unbound,
        }
    }

    #[inline]
    pub fn has_unbound(&self, name: &str) -> bool {
        self.unbound.iter().any(|n| n == name)
    }
}

impl PartialEq for TypeBindings {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names && self.types == other.types
    }
}

impl Eq for TypeBindings {}

impl Hash for TypeBindings {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.names.hash(state);
    }
}

impl fmt::Debug for TypeBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, ty) in self.names.iter().zip(&self.types) {
            map.entry(name, &format_args!("{ty}"));
        }
        map.finish()
    }
}
