use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use super::{ClassBuilder, FieldInfo, Markers, MethodInfo, Upcast};
use crate::types::{DeclaredType, TypeVariable};

// -----------------------------------------------------------------------------
// ClassShape

/// What kind of class a descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassShape {
    Primitive,
    Interface,
    /// Cannot be instantiated, but may declare state.
    Abstract,
    Concrete,
    Enumeration,
}

// -----------------------------------------------------------------------------
// Constructors

type Construct<A> = Arc<dyn Fn(A) -> Box<dyn Any> + Send + Sync>;

/// The constructors usable when reading: no argument, a single text
/// argument, or a single integer argument.
#[derive(Clone, Default)]
pub struct Constructors {
    pub(super) default: Option<Construct<()>>,
    pub(super) from_text: Option<Arc<dyn Fn(&str) -> Box<dyn Any> + Send + Sync>>,
    pub(super) from_int: Option<Construct<i64>>,
}

impl Constructors {
    /// No constructors at all.
    #[inline]
    pub fn none() -> Self {
        Self::default()
    }

    #[inline]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    #[inline]
    pub fn has_text(&self) -> bool {
        self.from_text.is_some()
    }

    #[inline]
    pub fn has_int(&self) -> bool {
        self.from_int.is_some()
    }

    #[inline]
    pub fn construct(&self) -> Option<Box<dyn Any>> {
        self.default.as_ref().map(|f| f(()))
    }

    #[inline]
    pub fn construct_from_text(&self, text: &str) -> Option<Box<dyn Any>> {
        self.from_text.as_ref().map(|f| f(text))
    }

    #[inline]
    pub fn construct_from_int(&self, value: i64) -> Option<Box<dyn Any>> {
        self.from_int.as_ref().map(|f| f(value))
    }
}

impl fmt::Debug for Constructors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructors")
            .field("default", &self.has_default())
            .field("text", &self.has_text())
            .field("int", &self.has_int())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// EnumAccess

/// Maps between enumeration values and their ordinals.
pub trait EnumAccess: Send + Sync + 'static {
    fn ordinal(&self, value: &dyn Any) -> Option<usize>;
    fn constant(&self, ordinal: usize) -> Option<Box<dyn Any>>;
}

pub(super) struct EnumFns<E> {
    pub ordinal: fn(&E) -> usize,
    pub constant: fn(usize) -> Option<E>,
}

impl<E: Any> EnumAccess for EnumFns<E> {
    fn ordinal(&self, value: &dyn Any) -> Option<usize> {
        value.downcast_ref::<E>().map(self.ordinal)
    }

    fn constant(&self, ordinal: usize) -> Option<Box<dyn Any>> {
        (self.constant)(ordinal).map(|value| Box::new(value) as Box<dyn Any>)
    }
}

// -----------------------------------------------------------------------------
// ClassDescriptor

/// The description of one class.
///
/// Built with a [`ClassBuilder`] and immutable afterwards.
///
/// # Examples
///
/// ```
/// use lb_bind::class::{ClassDescriptor, ClassShape};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let point = ClassDescriptor::builder::<Point>("Point")
///     .constructor(Point::default)
///     .field("x", |p| &p.x, |p| &mut p.x)
///     .field("y", |p| &p.y, |p| &mut p.y)
///     .build();
///
/// assert_eq!(point.shape(), ClassShape::Concrete);
/// assert_eq!(point.fields().len(), 2);
/// assert!(point.constructors().has_default());
/// ```
pub struct ClassDescriptor {
    pub(super) name: Cow<'static, str>,
    pub(super) type_id: Option<TypeId>,
    pub(super) shape: ClassShape,
    pub(super) type_params: Vec<TypeVariable>,
    pub(super) superclass: Option<DeclaredType>,
    pub(super) parent_view: Option<Arc<dyn Upcast>>,
    pub(super) interfaces: Vec<DeclaredType>,
    pub(super) fields: Vec<Arc<FieldInfo>>,
    pub(super) methods: Vec<Arc<MethodInfo>>,
    pub(super) constructors: Constructors,
    pub(super) markers: Markers,
    pub(super) enum_access: Option<Arc<dyn EnumAccess>>,
}

impl ClassDescriptor {
    /// Starts describing the Rust type `T` under the class name `name`.
    #[inline]
    pub fn builder<T: Any>(name: impl Into<Cow<'static, str>>) -> ClassBuilder<T> {
        ClassBuilder::new(name.into(), Some(TypeId::of::<T>()), ClassShape::Concrete)
    }

    /// Starts describing a class with no Rust type behind it.
    ///
    /// Such classes take part in type resolution but cannot be instantiated.
    #[inline]
    pub fn declare(name: impl Into<Cow<'static, str>>) -> ClassBuilder<()> {
        ClassBuilder::new(name.into(), None, ClassShape::Concrete)
    }

    /// Starts describing an interface.
    #[inline]
    pub fn interface(name: impl Into<Cow<'static, str>>) -> ClassBuilder<()> {
        ClassBuilder::new(name.into(), None, ClassShape::Interface)
    }

    /// Starts describing the Rust enum `E`; add its constants in ordinal order.
    pub fn enumeration<E: Any>(
        name: impl Into<Cow<'static, str>>,
        ordinal: fn(&E) -> usize,
        constant: fn(usize) -> Option<E>,
    ) -> ClassBuilder<E> {
        let mut builder =
            ClassBuilder::new(name.into(), Some(TypeId::of::<E>()), ClassShape::Enumeration);
        builder.desc.enum_access = Some(Arc::new(EnumFns { ordinal, constant }));
        builder
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn name_cow(&self) -> &Cow<'static, str> {
        &self.name
    }

    /// The Rust type this class describes, if any.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    #[inline]
    pub fn shape(&self) -> ClassShape {
        self.shape
    }

    /// Interfaces and abstract classes.
    #[inline]
    pub fn is_abstract(&self) -> bool {
        matches!(self.shape, ClassShape::Interface | ClassShape::Abstract)
    }

    #[inline]
    pub fn is_enum(&self) -> bool {
        self.shape == ClassShape::Enumeration
    }

    #[inline]
    pub fn type_params(&self) -> &[TypeVariable] {
        &self.type_params
    }

    #[inline]
    pub fn superclass(&self) -> Option<&DeclaredType> {
        self.superclass.as_ref()
    }

    /// The projection onto the superclass part of an instance.
    #[inline]
    pub fn parent_view(&self) -> Option<&Arc<dyn Upcast>> {
        self.parent_view.as_ref()
    }

    #[inline]
    pub fn interfaces(&self) -> &[DeclaredType] {
        &self.interfaces
    }

    #[inline]
    pub fn fields(&self) -> &[Arc<FieldInfo>] {
        &self.fields
    }

    #[inline]
    pub fn methods(&self) -> &[Arc<MethodInfo>] {
        &self.methods
    }

    pub fn field(&self, name: &str) -> Option<&Arc<FieldInfo>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn method(&self, name: &str) -> Option<&Arc<MethodInfo>> {
        self.methods.iter().find(|m| m.name() == name)
    }

    #[inline]
    pub fn constructors(&self) -> &Constructors {
        &self.constructors
    }

    /// Class-level markers.
    #[inline]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    #[inline]
    pub fn enum_access(&self) -> Option<&Arc<dyn EnumAccess>> {
        self.enum_access.as_ref()
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("type_params", &self.type_params)
            .field("superclass", &self.superclass)
            .field("interfaces", &self.interfaces)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .field("constructors", &self.constructors)
            .finish_non_exhaustive()
    }
}
