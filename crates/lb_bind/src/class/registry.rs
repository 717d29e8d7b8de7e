use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;
use core::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::SystemTime;

use lb_utils::TypeIdMap;
use lb_utils::hash::{HashMap, HashSet};

use super::{ClassDescriptor, ClassShape, Upcast};
use crate::class::ChainedUpcast;
use crate::types::DeclaredType;
use crate::value::Value;

// -----------------------------------------------------------------------------
// ClassSubmission

/// A descriptor factory collected by [`ClassRegistry::auto_register`].
///
/// Submit one with [`submit_class!`](crate::submit_class).
pub struct ClassSubmission {
    build: fn() -> ClassDescriptor,
}

impl ClassSubmission {
    #[inline]
    pub const fn new(build: fn() -> ClassDescriptor) -> Self {
        Self { build }
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(ClassSubmission);

/// Submits a descriptor factory for [`ClassRegistry::auto_register`].
///
/// Does nothing without the `auto_register` feature.
///
/// ```no_run
/// use lb_bind::class::ClassDescriptor;
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
/// }
///
/// fn point() -> ClassDescriptor {
///     ClassDescriptor::builder::<Point>("Point")
///         .constructor(Point::default)
///         .field("x", |p| &p.x, |p| &mut p.x)
///         .build()
/// }
///
/// lb_bind::submit_class!(point);
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! submit_class {
    ($build:path) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::class::ClassSubmission::new($build)
        }
    };
}

#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! submit_class {
    ($build:path) => {};
}

// -----------------------------------------------------------------------------
// ClassRegistry

/// All classes known to a [`Blueprint`](crate::Blueprint), by name and by
/// Rust [`TypeId`].
///
/// [`ClassRegistry::new`] seeds the built-in classes: `Object`, `()`, the
/// primitives, the text types, `Collection<E>` / `List<E>` / `Set<E>` /
/// `Map<K, V>` and their std implementations, `SystemTime`, the identifier
/// types `PathBuf` / `IpAddr` / `SocketAddr`, and the tree node `Value`.
pub struct ClassRegistry {
    classes: HashMap<Cow<'static, str>, Arc<ClassDescriptor>>,
    by_type: TypeIdMap<Cow<'static, str>>,
}

impl ClassRegistry {
    /// A registry holding the built-in classes.
    pub fn new() -> Self {
        let mut registry = Self {
            classes: HashMap::default(),
            by_type: TypeIdMap::new(),
        };
        register_builtins(&mut registry);
        registry
    }

    /// Adds a class, replacing any class of the same name.
    pub fn register(&mut self, desc: ClassDescriptor) -> Arc<ClassDescriptor> {
        let name = desc.name_cow().clone();
        if let Some(type_id) = desc.type_id() {
            self.by_type.insert(type_id, name.clone());
        }
        let desc = Arc::new(desc);
        self.classes.insert(name, desc.clone());
        desc
    }

    /// Maps another Rust type onto an existing class, such as each
    /// instantiation of a generic host type.
    pub fn alias_type<T: Any>(&mut self, class: impl Into<Cow<'static, str>>) {
        self.by_type.insert(TypeId::of::<T>(), class.into());
    }

    /// Registers every descriptor submitted with [`submit_class!`](crate::submit_class).
    ///
    /// Classes already present are kept. Returns `false` when the
    /// `auto_register` feature is disabled.
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            for submission in inventory::iter::<ClassSubmission> {
                let desc = (submission.build)();
                if !self.contains(desc.name()) {
                    self.register(desc);
                }
            }
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Arc<ClassDescriptor>> {
        self.classes.get(name)
    }

    pub fn get_by_type_id(&self, type_id: TypeId) -> Option<&Arc<ClassDescriptor>> {
        self.by_type.get(&type_id).and_then(|name| self.get(name))
    }

    #[inline]
    pub fn get_type<T: Any>(&self) -> Option<&Arc<ClassDescriptor>> {
        self.get_by_type_id(TypeId::of::<T>())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Iterates over all registered classes in no particular order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClassDescriptor>> {
        self.classes.values()
    }

    /// The superclass chain of `class`, base first and ending with `class`.
    ///
    /// Each entry carries the projection from an instance of `class` onto
    /// that ancestor. `None` means the instance is used as is, for `class`
    /// itself and for ancestors declared with [`ClassBuilder::extends`](super::ClassBuilder::extends).
    pub fn lineage(
        &self,
        class: &Arc<ClassDescriptor>,
    ) -> Vec<(Arc<ClassDescriptor>, Option<Arc<dyn Upcast>>)> {
        let mut chain = Vec::new();
        let mut seen = HashSet::<String>::default();
        let mut view: Option<Arc<dyn Upcast>> = None;
        let mut current = class.clone();
        loop {
            chain.push((current.clone(), view.clone()));
            if !seen.insert(String::from(current.name())) {
                break;
            }
            let Some(parent) = current
                .superclass()
                .and_then(DeclaredType::raw_name)
                .and_then(|name| self.get(name))
                .cloned()
            else {
                break;
            };
            view = match (view, current.parent_view().cloned()) {
                (Some(first), Some(then)) => Some(Arc::new(ChainedUpcast { first, then })),
                (view, None) => view,
                (None, step) => step,
            };
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Whether `from` is `to` or one of its subtypes.
    pub fn is_assignable(&self, from: &str, to: &str) -> bool {
        let mut pending = alloc::vec![String::from(from)];
        let mut seen = HashSet::<String>::default();
        while let Some(name) = pending.pop() {
            if name == to {
                return true;
            }
            if !seen.insert(name.clone()) {
                continue;
            }
            let Some(desc) = self.get(&name) else {
                continue;
            };
            pending.extend(
                desc.superclass()
                    .into_iter()
                    .chain(desc.interfaces())
                    .filter_map(DeclaredType::raw_name)
                    .map(String::from),
            );
        }
        false
    }
}

impl Default for ClassRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.classes.keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// Built-in classes

fn register_builtins(registry: &mut ClassRegistry) {
    use DeclaredType as D;

    registry.register(ClassDescriptor::declare("Object").build());

    macro_rules! primitives {
        ($($ty:ty => $name:literal),* $(,)?) => {$(
            registry.register(
                ClassDescriptor::builder::<$ty>($name)
                    .shape(ClassShape::Primitive)
                    .build(),
            );
        )*};
    }

    primitives! {
        () => "()",
        bool => "bool",
        char => "char",
        i8 => "i8",
        i16 => "i16",
        i32 => "i32",
        i64 => "i64",
        i128 => "i128",
        u8 => "u8",
        u16 => "u16",
        u32 => "u32",
        u64 => "u64",
        f32 => "f32",
        f64 => "f64",
    }

    registry.register(ClassDescriptor::interface("TextSequence").build());
    registry.register(
        ClassDescriptor::builder::<String>("String")
            .implements(D::class("TextSequence"))
            .build(),
    );
    registry.register(
        ClassDescriptor::builder::<Box<str>>("Box<str>")
            .implements(D::class("TextSequence"))
            .build(),
    );
    registry.register(
        ClassDescriptor::builder::<Arc<str>>("Arc<str>")
            .implements(D::class("TextSequence"))
            .build(),
    );
    registry.register(
        ClassDescriptor::builder::<Cow<'static, str>>("Cow<str>")
            .implements(D::class("TextSequence"))
            .build(),
    );

    registry.register(ClassDescriptor::interface("TreeNode").build());
    registry.register(
        ClassDescriptor::builder::<Value<'static>>("Value")
            .implements(D::class("TreeNode"))
            .build(),
    );

    registry.register(ClassDescriptor::interface("Collection").type_param("E").build());
    for list in ["List", "Set"] {
        registry.register(
            ClassDescriptor::interface(list)
                .type_param("E")
                .implements(D::generic("Collection", [D::var("E")]))
                .build(),
        );
    }
    registry.register(
        ClassDescriptor::interface("Map")
            .type_param("K")
            .type_param("V")
            .build(),
    );
    for (class, interface) in [
        ("Vec", "List"),
        ("VecDeque", "List"),
        ("HashSet", "Set"),
        ("BTreeSet", "Set"),
    ] {
        registry.register(
            ClassDescriptor::declare(class)
                .type_param("E")
                .implements(D::generic(interface, [D::var("E")]))
                .build(),
        );
    }
    for class in ["HashMap", "BTreeMap"] {
        registry.register(
            ClassDescriptor::declare(class)
                .type_param("K")
                .type_param("V")
                .implements(D::generic("Map", [D::var("K"), D::var("V")]))
                .build(),
        );
    }

    registry.register(ClassDescriptor::builder::<SystemTime>("SystemTime").build());
    registry.register(ClassDescriptor::builder::<PathBuf>("PathBuf").build());
    registry.register(ClassDescriptor::builder::<IpAddr>("IpAddr").build());
    registry.register(ClassDescriptor::builder::<SocketAddr>("SocketAddr").build());
}

// -----------------------------------------------------------------------------
// Tests
