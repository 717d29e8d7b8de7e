use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use bitflags::bitflags;

use super::{Getter, Markers, Setter};
use crate::types::DeclaredType;

// -----------------------------------------------------------------------------
// Visibility

/// Declared access level of a member, ordered from least to most visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Visibility {
    Private,
    Package,
    Protected,
    #[default]
    Public,
}

bitflags! {
    /// Declaration modifiers of a member.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Belongs to the class rather than to instances.
        const STATIC = 1;
        /// Not part of the persistent state.
        const TRANSIENT = 1 << 1;
        const FINAL = 1 << 2;
    }
}

// -----------------------------------------------------------------------------
// FieldInfo

/// A declared field.
pub struct FieldInfo {
    pub(super) name: Cow<'static, str>,
    pub(super) declared: DeclaredType,
    pub(super) visibility: Visibility,
    pub(super) modifiers: Modifiers,
    pub(super) markers: Markers,
    pub(super) getter: Option<Arc<dyn Getter>>,
    pub(super) setter: Option<Arc<dyn Setter>>,
    pub(super) constant: Option<usize>,
}

impl FieldInfo {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[inline]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    #[inline]
    pub fn getter(&self) -> Option<&Arc<dyn Getter>> {
        self.getter.as_ref()
    }

    #[inline]
    pub fn setter(&self) -> Option<&Arc<dyn Setter>> {
        self.setter.as_ref()
    }

    /// The ordinal of an enumeration constant.
    #[inline]
    pub fn constant(&self) -> Option<usize> {
        self.constant
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("declared", &self.declared)
            .field("visibility", &self.visibility)
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// MethodInfo

/// The accessor role of a method.
#[derive(Clone)]
pub enum MethodKind {
    /// Takes no argument and returns a value.
    Getter {
        returns: DeclaredType,
        access: Arc<dyn Getter>,
    },
    /// Takes a single argument.
    Setter {
        param: DeclaredType,
        access: Arc<dyn Setter>,
    },
    /// Any other method; never an accessor.
    Other { params: usize },
}

/// A declared method.
pub struct MethodInfo {
    pub(super) name: Cow<'static, str>,
    pub(super) visibility: Visibility,
    pub(super) modifiers: Modifiers,
    pub(super) markers: Markers,
    pub(super) kind: MethodKind,
}

impl MethodInfo {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[inline]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    #[inline]
    pub fn kind(&self) -> &MethodKind {
        &self.kind
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            MethodKind::Getter { .. } => "getter",
            MethodKind::Setter { .. } => "setter",
            MethodKind::Other { .. } => "other",
        };
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("visibility", &self.visibility)
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Member

/// A borrowed field or method, the identity metadata lookups are keyed by.
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    Field(&'a FieldInfo),
    Method(&'a MethodInfo),
}

impl<'a> Member<'a> {
    #[inline]
    pub fn name(&self) -> &'a str {
        match *self {
            Self::Field(field) => field.name(),
            Self::Method(method) => method.name(),
        }
    }

    #[inline]
    pub fn markers(&self) -> &'a Markers {
        match *self {
            Self::Field(field) => field.markers(),
            Self::Method(method) => method.markers(),
        }
    }

    #[inline]
    pub fn is_field(&self) -> bool {
        matches!(self, Self::Field(_))
    }
}
