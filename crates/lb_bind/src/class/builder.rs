use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::marker::PhantomData;

use super::access::{FieldGet, FieldSet, MethodGet, MethodSet, StaticGet, TryMethodSet, UpcastFn};
use super::{ClassDescriptor, ClassShape, Constructors, FieldInfo, Markers, MethodInfo};
use super::{MethodKind, Modifiers, Visibility};
use crate::error::BoxedError;
use crate::types::{DeclaredType, TypeVariable, Typed};
use crate::value::{FromValue, IntoValue, ToValue};

enum LastMember {
    Field(usize),
    Method(usize),
}

// -----------------------------------------------------------------------------
// ClassBuilder

/// Builds a [`ClassDescriptor`] for the Rust type `T`.
///
/// Member modifiers such as [`private`](Self::private) or
/// [`marker`](Self::marker) apply to the member added last.
///
/// # Examples
///
/// ```
/// use lb_bind::class::{ClassDescriptor, Ignore, Visibility};
///
/// #[derive(Default)]
/// struct Account {
///     id: u64,
///     secret: String,
///     label: String,
/// }
///
/// impl Account {
///     fn get_label(&self) -> String {
///         self.label.clone()
///     }
///     fn set_label(&mut self, label: String) {
///         self.label = label;
///     }
/// }
///
/// let account = ClassDescriptor::builder::<Account>("Account")
///     .constructor(Account::default)
///     .field("id", |a| &a.id, |a| &mut a.id)
///     .field("secret", |a| &a.secret, |a| &mut a.secret)
///     .marker(Ignore)
///     .field("label", |a| &a.label, |a| &mut a.label)
///     .private()
///     .getter("getLabel", Account::get_label)
///     .setter("setLabel", Account::set_label)
///     .build();
///
/// assert!(account.field("secret").unwrap().markers().contains::<Ignore>());
/// assert_eq!(account.field("label").unwrap().visibility(), Visibility::Private);
/// assert_eq!(account.methods().len(), 2);
/// ```
pub struct ClassBuilder<T> {
    pub(super) desc: ClassDescriptor,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
    last: Option<LastMember>,
    _marker: PhantomData<fn(T)>,
}

impl<T: Any> ClassBuilder<T> {
    pub(super) fn new(name: Cow<'static, str>, type_id: Option<TypeId>, shape: ClassShape) -> Self {
        Self {
            desc: ClassDescriptor {
                name,
                type_id,
                shape,
                type_params: Vec::new(),
                superclass: None,
                parent_view: None,
                interfaces: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                constructors: Constructors::default(),
                markers: Markers::new(),
                enum_access: None,
            },
            fields: Vec::new(),
            methods: Vec::new(),
            last: None,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn shape(mut self, shape: ClassShape) -> Self {
        self.desc.shape = shape;
        self
    }

    /// Declares an unbounded type parameter.
    #[inline]
    pub fn type_param(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.desc.type_params.push(TypeVariable::new(name));
        self
    }

    /// Declares a type parameter with bounds; the first bound is used when
    /// the parameter is left unbound.
    #[inline]
    pub fn type_param_bounded(
        mut self,
        name: impl Into<Cow<'static, str>>,
        bounds: impl Into<Vec<DeclaredType>>,
    ) -> Self {
        self.desc.type_params.push(TypeVariable::bounded(name, bounds));
        self
    }

    /// Declares the superclass without a projection onto it.
    ///
    /// Inherited accessors then receive the derived object as is.
    #[inline]
    pub fn extends(mut self, superclass: DeclaredType) -> Self {
        self.desc.superclass = Some(superclass);
        self
    }

    /// Declares the superclass `B`, embedded in `T` and reached through `up`.
    pub fn extends_with<B: Any>(
        mut self,
        superclass: DeclaredType,
        up: fn(&T) -> &B,
        up_mut: fn(&mut T) -> &mut B,
    ) -> Self {
        self.desc.superclass = Some(superclass);
        self.desc.parent_view = Some(Arc::new(UpcastFn { up, up_mut }));
        self
    }

    #[inline]
    pub fn implements(mut self, interface: DeclaredType) -> Self {
        self.desc.interfaces.push(interface);
        self
    }

    /// Adds a class-level marker.
    #[inline]
    pub fn class_marker<M: Any + Send + Sync>(mut self, marker: M) -> Self {
        self.desc.markers.insert(marker);
        self
    }

    // -------------------------------------------------------------------------
    // Constructors

    pub fn constructor(mut self, f: fn() -> T) -> Self {
        self.desc.constructors.default = Some(Arc::new(move |()| Box::new(f()) as Box<dyn Any>));
        self
    }

    pub fn text_constructor(mut self, f: fn(&str) -> T) -> Self {
        self.desc.constructors.from_text = Some(Arc::new(move |text: &str| Box::new(f(text)) as Box<dyn Any>));
        self
    }

    pub fn int_constructor(mut self, f: fn(i64) -> T) -> Self {
        self.desc.constructors.from_int = Some(Arc::new(move |value| Box::new(f(value)) as Box<dyn Any>));
        self
    }

    // -------------------------------------------------------------------------
    // Members

    fn push_field(mut self, field: FieldInfo) -> Self {
        self.last = Some(LastMember::Field(self.fields.len()));
        self.fields.push(field);
        self
    }

    fn push_method(mut self, name: Cow<'static, str>, kind: MethodKind) -> Self {
        self.last = Some(LastMember::Method(self.methods.len()));
        self.methods.push(MethodInfo {
            name,
            visibility: Visibility::Public,
            modifiers: Modifiers::empty(),
            markers: Markers::new(),
            kind,
        });
        self
    }

    /// Adds a readable and writable field.
    pub fn field<F>(self, name: impl Into<Cow<'static, str>>, get: fn(&T) -> &F, get_mut: fn(&mut T) -> &mut F) -> Self
    where
        F: Typed + ToValue + FromValue + 'static,
    {
        self.push_field(FieldInfo {
            name: name.into(),
            declared: F::declared_type(),
            visibility: Visibility::Public,
            modifiers: Modifiers::empty(),
            markers: Markers::new(),
            getter: Some(Arc::new(FieldGet { get })),
            setter: Some(Arc::new(FieldSet { get_mut })),
            constant: None,
        })
    }

    /// Adds a field that can only be read.
    pub fn readonly_field<F>(self, name: impl Into<Cow<'static, str>>, get: fn(&T) -> &F) -> Self
    where
        F: Typed + ToValue + 'static,
    {
        self.push_field(FieldInfo {
            name: name.into(),
            declared: F::declared_type(),
            visibility: Visibility::Public,
            modifiers: Modifiers::FINAL,
            markers: Markers::new(),
            getter: Some(Arc::new(FieldGet { get })),
            setter: None,
            constant: None,
        })
    }

    /// Adds a field that is only declared, with no accessors.
    pub fn declared_field(self, name: impl Into<Cow<'static, str>>, declared: DeclaredType) -> Self {
        self.push_field(FieldInfo {
            name: name.into(),
            declared,
            visibility: Visibility::Public,
            modifiers: Modifiers::empty(),
            markers: Markers::new(),
            getter: None,
            setter: None,
            constant: None,
        })
    }

    /// Adds a class-scoped field, read through `get`.
    pub fn static_field<R>(self, name: impl Into<Cow<'static, str>>, get: fn() -> R) -> Self
    where
        R: Typed + IntoValue + 'static,
    {
        self.push_field(FieldInfo {
            name: name.into(),
            declared: R::declared_type(),
            visibility: Visibility::Public,
            modifiers: Modifiers::STATIC | Modifiers::FINAL,
            markers: Markers::new(),
            getter: Some(Arc::new(StaticGet { call: get })),
            setter: None,
            constant: None,
        })
    }

    /// Adds a getter method, such as `getName` or `isActive`.
    pub fn getter<R>(self, name: impl Into<Cow<'static, str>>, call: fn(&T) -> R) -> Self
    where
        R: Typed + IntoValue + 'static,
    {
        let kind = MethodKind::Getter {
            returns: R::declared_type(),
            access: Arc::new(MethodGet { call }),
        };
        self.push_method(name.into(), kind)
    }

    /// Adds a setter method, such as `setName`.
    pub fn setter<V>(self, name: impl Into<Cow<'static, str>>, call: fn(&mut T, V)) -> Self
    where
        V: Typed + FromValue + 'static,
    {
        let kind = MethodKind::Setter {
            param: V::declared_type(),
            access: Arc::new(MethodSet { call }),
        };
        self.push_method(name.into(), kind)
    }

    /// Adds a setter method that may fail.
    pub fn try_setter<V>(
        self,
        name: impl Into<Cow<'static, str>>,
        call: fn(&mut T, V) -> Result<(), BoxedError>,
    ) -> Self
    where
        V: Typed + FromValue + 'static,
    {
        let kind = MethodKind::Setter {
            param: V::declared_type(),
            access: Arc::new(TryMethodSet { call }),
        };
        self.push_method(name.into(), kind)
    }

    /// Adds a method that is not an accessor.
    #[inline]
    pub fn method(self, name: impl Into<Cow<'static, str>>, params: usize) -> Self {
        self.push_method(name.into(), MethodKind::Other { params })
    }

    /// Adds the next enumeration constant.
    pub fn constant(self, name: impl Into<Cow<'static, str>>) -> Self {
        let ordinal = self.fields.iter().filter(|f| f.constant.is_some()).count();
        let declared = DeclaredType::Class(self.desc.name.clone());
        self.push_field(FieldInfo {
            name: name.into(),
            declared,
            visibility: Visibility::Public,
            modifiers: Modifiers::STATIC | Modifiers::FINAL,
            markers: Markers::new(),
            getter: None,
            setter: None,
            constant: Some(ordinal),
        })
    }

    // -------------------------------------------------------------------------
    // Last member

    fn edit_last(
        mut self,
        field: impl FnOnce(&mut FieldInfo),
        method: impl FnOnce(&mut MethodInfo),
    ) -> Self {
        match self.last {
            Some(LastMember::Field(index)) => field(&mut self.fields[index]),
            Some(LastMember::Method(index)) => method(&mut self.methods[index]),
            None => {}
        }
        self
    }

    #[inline]
    pub fn visibility(self, visibility: Visibility) -> Self {
        self.edit_last(|f| f.visibility = visibility, |m| m.visibility = visibility)
    }

    #[inline]
    pub fn private(self) -> Self {
        self.visibility(Visibility::Private)
    }

    #[inline]
    pub fn package(self) -> Self {
        self.visibility(Visibility::Package)
    }

    #[inline]
    pub fn protected(self) -> Self {
        self.visibility(Visibility::Protected)
    }

    /// Marks the last member as not part of the persistent state.
    #[inline]
    pub fn transient(self) -> Self {
        self.edit_last(
            |f| f.modifiers |= Modifiers::TRANSIENT,
            |m| m.modifiers |= Modifiers::TRANSIENT,
        )
    }

    /// Marks the last member as class-scoped.
    #[inline]
    pub fn class_scoped(self) -> Self {
        self.edit_last(
            |f| f.modifiers |= Modifiers::STATIC,
            |m| m.modifiers |= Modifiers::STATIC,
        )
    }

    /// Overrides the declared type of the last member, typically with a
    /// reference to a type parameter.
    pub fn typed(self, declared: DeclaredType) -> Self {
        let for_method = declared.clone();
        self.edit_last(
            |f| f.declared = declared,
            |m| match &mut m.kind {
                MethodKind::Getter { returns, .. } => *returns = for_method,
                MethodKind::Setter { param, .. } => *param = for_method,
                MethodKind::Other { .. } => {}
            },
        )
    }

    /// Attaches a marker to the last member.
    pub fn marker<M: Any + Send + Sync + Clone>(self, marker: M) -> Self {
        let for_method = marker.clone();
        self.edit_last(
            |f| f.markers.insert(marker),
            |m| m.markers.insert(for_method),
        )
    }

    // -------------------------------------------------------------------------
    // Build

    /// Finishes the descriptor.
    ///
    /// Bare references to the declared type parameters pick up their bounds.
    pub fn build(self) -> ClassDescriptor {
        let Self {
            mut desc,
            fields,
            methods,
            ..
        } = self;
        let params = desc.type_params.clone();

        desc.superclass = desc.superclass.map(|ty| ty.with_declared_bounds(&params));
        desc.interfaces = desc
            .interfaces
            .into_iter()
            .map(|ty| ty.with_declared_bounds(&params))
            .collect();
        desc.fields = fields
            .into_iter()
            .map(|mut field| {
                field.declared = field.declared.with_declared_bounds(&params);
                Arc::new(field)
            })
            .collect();
        desc.methods = methods
            .into_iter()
            .map(|mut method| {
                match &mut method.kind {
                    MethodKind::Getter { returns: ty, .. } | MethodKind::Setter { param: ty, .. } => {
                        *ty = core::mem::replace(ty, DeclaredType::wildcard()).with_declared_bounds(&params);
                    }
                    MethodKind::Other { .. } => {}
                }
                Arc::new(method)
            })
            .collect();
        desc
    }
}
