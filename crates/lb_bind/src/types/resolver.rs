use alloc::borrow::Cow;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use std::sync::{Mutex, PoisonError};

use lb_utils::BoundedMap;
use lb_utils::hash::HashMap;

use super::resolved::Origin;
use super::{DeclaredType, ResolvedType, TypeBindings, TypeKind, Typed};
use crate::class::{ClassDescriptor, ClassRegistry, ClassShape};
use crate::error::BindError;

/// Default number of entries kept by the [`TypeResolver`] cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

// -----------------------------------------------------------------------------
// Resolution scope

/// One class currently being resolved, with the placeholders handed out for it.
struct Frame {
    class: Cow<'static, str>,
    bindings: TypeBindings,
    placeholders: Vec<ResolvedType>,
}

/// State of one top-level [`TypeResolver::resolve`] call.
#[derive(Default)]
struct Scope {
    stack: Vec<Frame>,
    // Committed to the shared cache once the outermost frame is done.
    pending: Vec<(Cow<'static, str>, ResolvedType)>,
}

impl Scope {
    fn pending(&self, class: &str) -> Option<&ResolvedType> {
        self.pending
            .iter()
            .find_map(|(name, ty)| (name == class).then_some(ty))
    }
}

// -----------------------------------------------------------------------------
// TypeResolver

/// Resolves [`DeclaredType`]s against a [`ClassRegistry`].
///
/// `Object`, `()` and the primitives resolve to pre-built singletons. Other
/// classes referenced without type arguments are kept in a shared cache,
/// bounded to a fixed number of entries and cleared as a whole when full.
/// Parameterized references build a fresh node on every call.
///
/// The resolver is `Send + Sync`; only the cache is locked.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lb_bind::class::ClassRegistry;
/// use lb_bind::types::{DeclaredType, TypeBindings, TypeResolver};
///
/// let resolver = TypeResolver::new(Arc::new(ClassRegistry::new()));
/// let list = resolver
///     .resolve(
///         &TypeBindings::empty(),
///         &DeclaredType::generic("Vec", [DeclaredType::class("String")]),
///     )
///     .unwrap();
///
/// let collection = list.type_parameters_for("Collection").unwrap();
/// assert_eq!(collection.get(0).unwrap().class_name(), "String");
/// ```
pub struct TypeResolver {
    registry: Arc<ClassRegistry>,
    object: ResolvedType,
    singletons: HashMap<Cow<'static, str>, ResolvedType>,
    cache: Mutex<BoundedMap<Cow<'static, str>, ResolvedType>>,
}

impl TypeResolver {
    /// Creates a resolver with a cache of [`DEFAULT_CACHE_CAPACITY`] entries.
    #[inline]
    pub fn new(registry: Arc<ClassRegistry>) -> Self {
        Self::with_cache_capacity(registry, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(registry: Arc<ClassRegistry>, capacity: usize) -> Self {
        let object = ResolvedType::new_class(
            Cow::Borrowed("Object"),
            TypeKind::Class,
            TypeBindings::empty(),
            None,
            Vec::new(),
        );
        let mut singletons = HashMap::default();
        singletons.insert(Cow::Borrowed("Object"), object.clone());
        for desc in registry.iter() {
            if desc.shape() == ClassShape::Primitive {
                let node = ResolvedType::new_class(
                    desc.name_cow().clone(),
                    TypeKind::Primitive,
                    TypeBindings::empty(),
                    None,
                    Vec::new(),
                );
                singletons.insert(desc.name_cow().clone(), node);
            }
        }
        Self {
            registry,
            object,
            singletons,
            cache: Mutex::new(BoundedMap::new(capacity)),
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// The universal base type.
    #[inline]
    pub fn object(&self) -> ResolvedType {
        self.object.clone()
    }

    /// Resolves `declared` in the context of `bindings`.
    ///
    /// Type variables are looked up in `bindings`. Unbound variables resolve
    /// to their first bound, or to `Object`.
    pub fn resolve(
        &self,
        bindings: &TypeBindings,
        declared: &DeclaredType,
    ) -> Result<ResolvedType, BindError> {
        let mut scope = Scope::default();
        let resolved = self.resolve_in(&mut scope, bindings, declared)?;
        debug_assert!(scope.stack.is_empty());
        self.commit(scope.pending);
        Ok(resolved)
    }

    /// Resolves a class referenced by name, without type arguments.
    #[inline]
    pub fn resolve_class(&self, name: &str) -> Result<ResolvedType, BindError> {
        self.resolve(&TypeBindings::empty(), &DeclaredType::class(name.to_owned()))
    }

    /// Resolves the declared type of a Rust type.
    #[inline]
    pub fn resolve_typed<T: Typed>(&self) -> Result<ResolvedType, BindError> {
        self.resolve(&TypeBindings::empty(), &T::declared_type())
    }

    /// Number of cached entries.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn clear_cache(&self) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Builds `class` with `bindings` again, outside of the cache.
    pub(crate) fn rebuild(
        &self,
        class: &str,
        bindings: TypeBindings,
    ) -> Result<ResolvedType, BindError> {
        let desc = self.descriptor(class)?;
        self.resolve_desc(&mut Scope::default(), &desc, bindings, false)
    }

    fn resolve_in(
        &self,
        scope: &mut Scope,
        bindings: &TypeBindings,
        declared: &DeclaredType,
    ) -> Result<ResolvedType, BindError> {
        match declared {
            DeclaredType::Class(name) => {
                let desc = self.descriptor(name)?;
                self.resolve_desc(scope, &desc, TypeBindings::empty(), true)
            }
            DeclaredType::Parameterized { raw, args } => {
                let desc = self.descriptor(raw)?;
                let types = args
                    .iter()
                    .map(|arg| self.resolve_in(scope, bindings, arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let own = TypeBindings::create(desc.name(), desc.type_params(), types)?;
                self.resolve_desc(scope, &desc, own, false)
            }
            DeclaredType::Array(element) => {
                let element = self.resolve_in(scope, bindings, element)?;
                Ok(ResolvedType::new_array(element))
            }
            DeclaredType::Variable(var) => {
                if let Some(bound) = bindings.find(&var.name) {
                    return Ok(bound.clone());
                }
                if bindings.has_unbound(&var.name) {
                    return Ok(self.object());
                }
                match var.bounds.first() {
                    Some(bound) => {
                        let marked = bindings.with_unbound(var.name.clone());
                        self.resolve_in(scope, &marked, bound)
                    }
                    None => Ok(self.object()),
                }
            }
            DeclaredType::Wildcard { upper } => match upper.first() {
                Some(bound) => self.resolve_in(scope, bindings, bound),
                None => Ok(self.object()),
            },
        }
    }

    fn resolve_desc(
        &self,
        scope: &mut Scope,
        desc: &ClassDescriptor,
        bindings: TypeBindings,
        cacheable: bool,
    ) -> Result<ResolvedType, BindError> {
        let name = desc.name_cow();
        if cacheable {
            if let Some(ty) = self.singletons.get(name.as_ref()) {
                return Ok(ty.clone());
            }
            if let Some(ty) = self.cached(name) {
                return Ok(ty);
            }
            if let Some(ty) = scope.pending(name) {
                return Ok(ty.clone());
            }
        }

        if let Some(frame) = scope.stack.iter_mut().rev().find(|f| f.class == *name) {
            let origin = Origin::new(self.registry.clone(), name.clone(), frame.bindings.clone());
            let placeholder = ResolvedType::new_placeholder(name.clone(), bindings, origin);
            frame.placeholders.push(placeholder.clone());
            return Ok(placeholder);
        }

        scope.stack.push(Frame {
            class: name.clone(),
            bindings: bindings.clone(),
            placeholders: Vec::new(),
        });
        let built = self.build(scope, desc, bindings);
        let frame = scope.stack.pop();
        let node = built?;

        for placeholder in frame.into_iter().flat_map(|f| f.placeholders) {
            placeholder.patch(&node);
        }
        if cacheable {
            scope.pending.push((name.clone(), node.clone()));
        }
        Ok(node)
    }

    fn build(
        &self,
        scope: &mut Scope,
        desc: &ClassDescriptor,
        bindings: TypeBindings,
    ) -> Result<ResolvedType, BindError> {
        let parent = desc
            .superclass()
            .map(|superclass| self.resolve_in(scope, &bindings, superclass))
            .transpose()?;
        let interfaces = desc
            .interfaces()
            .iter()
            .map(|interface| self.resolve_in(scope, &bindings, interface))
            .collect::<Result<Vec<_>, _>>()?;
        let kind = match desc.shape() {
            ClassShape::Primitive => TypeKind::Primitive,
            ClassShape::Interface => TypeKind::Interface,
            _ => TypeKind::Class,
        };
        Ok(ResolvedType::new_class(
            desc.name_cow().clone(),
            kind,
            bindings,
            parent,
            interfaces,
        ))
    }

    fn descriptor(&self, name: &str) -> Result<Arc<ClassDescriptor>, BindError> {
        self.registry
            .get(name)
            .cloned()
            .ok_or_else(|| BindError::UnknownClass(Cow::Owned(name.to_owned())))
    }

    fn cached(&self, class: &str) -> Option<ResolvedType> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get(class).cloned()
    }

    fn commit(&self, pending: Vec<(Cow<'static, str>, ResolvedType)>) {
        if pending.is_empty() {
            return;
        }
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        for (class, ty) in pending {
            if cache.insert(class, ty) {
                log::debug!(
                    "type cache reached {} entries and was cleared",
                    cache.capacity(),
                );
            }
        }
    }
}

impl fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeResolver")
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    use super::TypeResolver;
    use crate::class::{ClassDescriptor, ClassRegistry};
    use crate::error::BindError;
    use crate::locate::{DispatchTag, classify_type};
    use crate::types::{DeclaredType as D, TypeBindings, TypeKind, TypeVariable};

    struct Point;
    struct Pair;
    struct Node;

    fn resolver(capacity: usize) -> TypeResolver {
        let mut registry = ClassRegistry::new();
        registry.register(ClassDescriptor::builder::<Point>("Point").build());
        registry.register(
            ClassDescriptor::builder::<Pair>("Pair")
                .type_param("A")
                .type_param("B")
                .build(),
        );
        registry.register(
            ClassDescriptor::builder::<Node>("Node")
                .type_param("T")
                .declared_field("next", D::generic("Node", [D::var("T")]))
                .build(),
        );
        registry.register(ClassDescriptor::declare("Branch").type_param("B").build());
        registry.register(
            ClassDescriptor::declare("Tree")
                .type_param("T")
                .extends(D::generic("Branch", [D::generic("Tree", [D::var("T")])]))
                .build(),
        );
        registry.register(ClassDescriptor::interface("Comparable").type_param("T").build());
        registry.register(
            ClassDescriptor::declare("Ranked")
                .type_param_bounded("T", [D::generic("Comparable", [D::var("T")])])
                .implements(D::generic("Comparable", [D::var("T")]))
                .build(),
        );
        TypeResolver::with_cache_capacity(Arc::new(registry), capacity)
    }

    #[test]
    fn same_class_is_equal_across_cache_clear() {
        let resolver = resolver(16);
        let first = resolver.resolve_class("Point").unwrap();
        assert_eq!(resolver.cached_len(), 1);
        resolver.clear_cache();
        assert_eq!(resolver.cached_len(), 0);
        let second = resolver.resolve_class("Point").unwrap();
        assert!(!first.ptr_eq(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn primitives_are_singletons() {
        let resolver = resolver(16);
        let a = resolver.resolve_class("i32").unwrap();
        let b = resolver.resolve_class("i32").unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.kind(), TypeKind::Primitive);
        assert_eq!(resolver.cached_len(), 0);
    }

    #[test]
    fn bindings_keep_declaration_order() {
        let resolver = resolver(16);
        let pair = resolver
            .resolve(
                &TypeBindings::empty(),
                &D::generic("Pair", [D::class("String"), D::class("i32")]),
            )
            .unwrap();
        let bindings = pair.bindings();
        assert_eq!(bindings.names(), ["A", "B"]);
        assert_eq!(*bindings.get(0).unwrap(), resolver.resolve_class("String").unwrap());
        assert_eq!(*bindings.get(1).unwrap(), resolver.resolve_class("i32").unwrap());
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let resolver = resolver(16);
        let err = resolver
            .resolve(&TypeBindings::empty(), &D::generic("Pair", [D::class("String")]))
            .unwrap_err();
        assert!(matches!(
            err,
            BindError::TypeArity { expected: 2, found: 1, .. }
        ));
    }

    #[test]
    fn unknown_class_is_an_error() {
        let resolver = resolver(16);
        let err = resolver.resolve_class("Missing").unwrap_err();
        assert!(matches!(err, BindError::UnknownClass(ref name) if name == "Missing"));
    }

    #[test]
    fn self_reference_is_patched() {
        let resolver = resolver(16);
        let tree = resolver
            .resolve(&TypeBindings::empty(), &D::generic("Tree", [D::class("String")]))
            .unwrap();
        let branch = tree.parent().unwrap();
        assert_eq!(branch.class_name(), "Branch");

        let inner = branch.bindings().get(0).unwrap();
        assert!(inner.is_recursive());
        assert!(inner.target().unwrap().ptr_eq(&tree));
        assert_eq!(*inner, tree);
    }

    #[test]
    fn field_of_own_type_resolves_equal() {
        let resolver = resolver(16);
        let node = resolver
            .resolve(&TypeBindings::empty(), &D::generic("Node", [D::class("String")]))
            .unwrap();
        let desc = resolver.registry().get("Node").unwrap().clone();
        let field = desc.field("next").unwrap();
        let next = resolver.resolve(node.bindings(), field.declared_type()).unwrap();
        assert_eq!(next, node);
    }

    #[test]
    fn recursive_bound_terminates() {
        let resolver = resolver(16);
        let ranked = resolver.resolve_class("Ranked").unwrap();
        let comparable = &ranked.interfaces()[0];
        assert_eq!(comparable.class_name(), "Comparable");
        let bound = comparable.bindings().get(0).unwrap();
        assert_eq!(bound.class_name(), "Comparable");
        assert_eq!(bound.bindings().get(0).unwrap().class_name(), "Object");
    }

    #[test]
    fn unbound_variable_uses_its_bound() {
        let resolver = resolver(16);
        let var = TypeVariable::bounded("T", [D::class("String")]);
        let ty = resolver
            .resolve(&TypeBindings::empty(), &D::Variable(var))
            .unwrap();
        assert_eq!(ty.class_name(), "String");
        let any = resolver.resolve(&TypeBindings::empty(), &D::wildcard()).unwrap();
        assert_eq!(any, resolver.object());
    }

    #[test]
    fn arrays_wrap_their_element() {
        let resolver = resolver(16);
        let ty = resolver
            .resolve(&TypeBindings::empty(), &D::array(D::class("Point")))
            .unwrap();
        assert!(ty.is_array());
        assert_eq!(ty.class_name(), "[Point]");
        assert_eq!(ty.element().unwrap().class_name(), "Point");
    }

    #[test]
    fn overflow_clears_the_cache() {
        let resolver = resolver(2);
        let names = ["Point", "String", "PathBuf"];
        let resolved: Vec<_> = names
            .iter()
            .map(|name| resolver.resolve_class(name).unwrap())
            .collect();
        assert!(resolver.cached_len() <= 2);
        for (name, ty) in names.iter().zip(&resolved) {
            assert_eq!(resolver.resolve_class(name).unwrap(), *ty);
        }
    }

    #[test]
    fn placeholders_outlive_their_target() {
        let mut registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::declare("Leaf")
                .extends(D::generic("Vec", [D::class("Chain")]))
                .build(),
        );
        registry.register(ClassDescriptor::declare("Chain").extends(D::class("Leaf")).build());
        let registry = Arc::new(registry);
        let resolver = TypeResolver::with_cache_capacity(registry.clone(), 2);

        let chain = resolver.resolve_class("Chain").unwrap();
        let leaf = chain.parent().unwrap().clone();
        let element = || leaf.parent().unwrap().bindings().get(0).unwrap().clone();
        assert!(element().is_recursive());
        assert_eq!(classify_type(&registry, &element()).unwrap(), DispatchTag::OrderedList);

        // Only the placeholder's weak link is left once the cache overflows.
        drop(chain);
        for name in ["String", "PathBuf", "IpAddr"] {
            resolver.resolve_class(name).unwrap();
        }

        let target = element().target().unwrap();
        assert_eq!(target.class_name(), "Chain");
        assert!(!target.is_recursive());
        assert_eq!(target, resolver.resolve_class("Chain").unwrap());
        assert!(element().target().unwrap().ptr_eq(&target));
        assert_eq!(classify_type(&registry, &element()).unwrap(), DispatchTag::OrderedList);
    }
}
