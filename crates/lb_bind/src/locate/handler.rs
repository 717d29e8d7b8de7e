use alloc::sync::Arc;
use core::fmt;

use super::DispatchTag;
use crate::ext::{ValueRead, ValueWrite};
use crate::introspect::ObjectDefinition;
use crate::types::ResolvedType;

// -----------------------------------------------------------------------------
// ValueReader

/// The handler reading values of one type.
///
/// Element handlers of containers are looked up when the first element is
/// read, so recursive container types never build an infinite handler.
#[derive(Clone)]
pub enum ValueReader {
    Custom(Arc<dyn ValueRead>),
    /// Scalars, dates, identifiers and abstract text sequences.
    Scalar(DispatchTag),
    Array {
        tag: DispatchTag,
        element: ResolvedType,
    },
    Collection {
        element: ResolvedType,
    },
    Map {
        key: ResolvedType,
        value: ResolvedType,
    },
    Object(Arc<ObjectDefinition>),
    Enum(Arc<ObjectDefinition>),
    /// Delegates to the tree codec.
    Tree,
    /// Reads whatever comes as plain data.
    Any,
}

impl fmt::Debug for ValueReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Scalar(tag) => f.debug_tuple("Scalar").field(tag).finish(),
            Self::Array { tag, element } => f
                .debug_struct("Array")
                .field("tag", tag)
                .field("element", element)
                .finish(),
            Self::Collection { element } => f
                .debug_struct("Collection")
                .field("element", element)
                .finish(),
            Self::Map { key, value } => f
                .debug_struct("Map")
                .field("key", key)
                .field("value", value)
                .finish(),
            Self::Object(def) => f.debug_tuple("Object").field(&def.class().name()).finish(),
            Self::Enum(def) => f.debug_tuple("Enum").field(&def.class().name()).finish(),
            Self::Tree => f.write_str("Tree"),
            Self::Any => f.write_str("Any"),
        }
    }
}

// -----------------------------------------------------------------------------
// ValueWriter

/// The handler writing values of one type.
#[derive(Clone)]
pub enum ValueWriter {
    Custom(Arc<dyn ValueWrite>),
    /// Scalars, dates, identifiers and primitive arrays.
    Standard(DispatchTag),
    /// Object arrays and collections; elements go by their own class.
    Sequence,
    Map,
    Object(Arc<ObjectDefinition>),
    Enum(Arc<ObjectDefinition>),
    Tree,
    Any,
}

impl fmt::Debug for ValueWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Standard(tag) => f.debug_tuple("Standard").field(tag).finish(),
            Self::Sequence => f.write_str("Sequence"),
            Self::Map => f.write_str("Map"),
            Self::Object(def) => f.debug_tuple("Object").field(&def.class().name()).finish(),
            Self::Enum(def) => f.debug_tuple("Enum").field(&def.class().name()).finish(),
            Self::Tree => f.write_str("Tree"),
            Self::Any => f.write_str("Any"),
        }
    }
}
