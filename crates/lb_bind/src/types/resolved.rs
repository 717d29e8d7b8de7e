use alloc::borrow::Cow;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::OnceLock;

use super::{TypeBindings, TypeResolver};
use crate::class::ClassRegistry;

// -----------------------------------------------------------------------------
// TypeKind

/// The category of a [`ResolvedType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive,
    Array,
    Interface,
    Class,
    /// A back-reference to a type still being resolved further up.
    Recursive,
}

// -----------------------------------------------------------------------------
// ResolvedType

struct TypeNode {
    class: Cow<'static, str>,
    kind: TypeKind,
    bindings: TypeBindings,
    parent: Option<ResolvedType>,
    interfaces: Vec<ResolvedType>,
    element: Option<ResolvedType>,
    // Set once for `Recursive` nodes. Weak, so cyclic graphs can be freed.
    target: OnceLock<Weak<TypeNode>>,
    origin: Option<Origin>,
}

/// Where a placeholder's target came from.
///
/// When every strong reference to the target is gone, the placeholder
/// builds an equal target from the registry and keeps it. The rebuilt graph
/// has placeholders of its own pointing at the rebuilt node, so ownership
/// stays acyclic.
pub(crate) struct Origin {
    registry: Arc<ClassRegistry>,
    class: Cow<'static, str>,
    bindings: TypeBindings,
    rebuilt: OnceLock<ResolvedType>,
}

impl Origin {
    pub(crate) fn new(
        registry: Arc<ClassRegistry>,
        class: Cow<'static, str>,
        bindings: TypeBindings,
    ) -> Self {
        Self {
            registry,
            class,
            bindings,
            rebuilt: OnceLock::new(),
        }
    }

    fn rebuild(&self) -> Option<ResolvedType> {
        if let Some(ty) = self.rebuilt.get() {
            return Some(ty.clone());
        }
        let resolver = TypeResolver::with_cache_capacity(self.registry.clone(), 1);
        match resolver.rebuild(&self.class, self.bindings.clone()) {
            Ok(ty) => {
                log::debug!("rebuilt the freed target of a `{}` placeholder", self.class);
                Some(self.rebuilt.get_or_init(|| ty).clone())
            }
            Err(err) => {
                log::warn!("cannot rebuild `{}`: {err}", self.class);
                None
            }
        }
    }
}

/// A canonical, immutable node of the type graph.
///
/// Cloning is cheap. Equality is structural: two types are equal when they
/// have the same erased class and equal bindings, and arrays compare their
/// element types. A patched [`TypeKind::Recursive`] placeholder compares as
/// the node it points to.
#[derive(Clone)]
pub struct ResolvedType(Arc<TypeNode>);

impl ResolvedType {
    pub(crate) fn new_class(
        class: Cow<'static, str>,
        kind: TypeKind,
        bindings: TypeBindings,
        parent: Option<ResolvedType>,
        interfaces: Vec<ResolvedType>,
    ) -> Self {
        Self(Arc::new(TypeNode {
            class,
            kind,
            bindings,
            parent,
            interfaces,
            element: None,
            target: OnceLock::new(),
            origin: None,
        }))
    }

    pub(crate) fn new_array(element: ResolvedType) -> Self {
        Self(Arc::new(TypeNode {
            class: Cow::Owned(alloc::format!("[{}]", element.class_name())),
            kind: TypeKind::Array,
            bindings: TypeBindings::empty(),
            parent: None,
            interfaces: Vec::new(),
            element: Some(element),
            target: OnceLock::new(),
            origin: None,
        }))
    }

    pub(crate) fn new_placeholder(
        class: Cow<'static, str>,
        bindings: TypeBindings,
        origin: Origin,
    ) -> Self {
        Self(Arc::new(TypeNode {
            class,
            kind: TypeKind::Recursive,
            bindings,
            parent: None,
            interfaces: Vec::new(),
            element: None,
            target: OnceLock::new(),
            origin: Some(origin),
        }))
    }

    /// Points a placeholder at the node it stands for.
    pub(crate) fn patch(&self, target: &ResolvedType) {
        debug_assert_eq!(self.0.kind, TypeKind::Recursive);
        // A placeholder belongs to exactly one frame, so it is patched once.
        let _ = self.0.target.set(Arc::downgrade(&target.0));
    }

    /// The erased class name; arrays are named `[element]`.
    #[inline]
    pub fn class_name(&self) -> &str {
        &self.0.class
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.0.kind
    }

    #[inline]
    pub fn bindings(&self) -> &TypeBindings {
        &self.0.bindings
    }

    #[inline]
    pub fn parent(&self) -> Option<&ResolvedType> {
        self.0.parent.as_ref()
    }

    #[inline]
    pub fn interfaces(&self) -> &[ResolvedType] {
        &self.0.interfaces
    }

    /// The element type of an array.
    #[inline]
    pub fn element(&self) -> Option<&ResolvedType> {
        self.0.element.as_ref()
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.0.kind == TypeKind::Array
    }

    #[inline]
    pub fn is_recursive(&self) -> bool {
        self.0.kind == TypeKind::Recursive
    }

    /// For a patched placeholder, the node it stands for.
    ///
    /// A target that was freed is rebuilt, equal to the original.
    pub fn target(&self) -> Option<ResolvedType> {
        let weak = self.0.target.get()?;
        if let Some(node) = weak.upgrade() {
            return Some(ResolvedType(node));
        }
        self.0.origin.as_ref()?.rebuild()
    }

    /// Follows a placeholder to its target, or returns `self`.
    pub fn resolved(&self) -> ResolvedType {
        self.target().unwrap_or_else(|| self.clone())
    }

    #[inline]
    pub(crate) fn ptr_eq(&self, other: &ResolvedType) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Finds `class` among this type, its parents and its interfaces.
    ///
    /// Placeholders met on the way are matched by name but not followed.
    pub fn find_supertype(&self, class: &str) -> Option<ResolvedType> {
        fn walk(ty: &ResolvedType, class: &str) -> Option<ResolvedType> {
            if ty.class_name() == class {
                return Some(ty.resolved());
            }
            if ty.is_recursive() {
                return None;
            }
            if let Some(found) = ty.parent().and_then(|p| walk(p, class)) {
                return Some(found);
            }
            ty.interfaces().iter().find_map(|i| walk(i, class))
        }
        walk(&self.resolved(), class)
    }

    /// The bindings this type supplies to the ancestor `class`.
    ///
    /// For `struct Names extends ArrayList<String>`, asking for `Collection`
    /// yields `{E: String}`.
    pub fn type_parameters_for(&self, class: &str) -> Option<TypeBindings> {
        self.find_supertype(class).map(|ty| ty.bindings().clone())
    }
}

impl PartialEq for ResolvedType {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.resolved(), other.resolved());
        if a.ptr_eq(&b) {
            return true;
        }
        a.0.class == b.0.class && a.0.element == b.0.element && a.0.bindings == b.0.bindings
    }
}

impl Eq for ResolvedType {}

impl Hash for ResolvedType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.class.hash(state);
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(element) = self.element() {
            return write!(f, "[{element}]");
        }
        f.write_str(self.class_name())?;
        // Placeholders print their name only, so cyclic graphs stay finite.
        if self.is_recursive() || self.bindings().is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (index, ty) in self.bindings().types().iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(">")
    }
}

impl fmt::Debug for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResolvedType({:?}, {self})", self.kind())
    }
}
