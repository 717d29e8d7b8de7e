use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::error::ValueError;
use crate::types::DeclaredType;

// -----------------------------------------------------------------------------
// ObjectRef

/// A host object carried by [`Value::Object`].
///
/// Writers see borrowed objects, readers produce owned ones.
pub enum ObjectRef<'a> {
    Borrowed(&'a dyn Any),
    Owned(Box<dyn Any>),
}

impl ObjectRef<'_> {
    /// Returns the object itself, never the box around it.
    #[inline]
    pub fn as_any(&self) -> &dyn Any {
        match self {
            Self::Borrowed(obj) => *obj,
            Self::Owned(obj) => &**obj,
        }
    }

    /// Returns the [`TypeId`] of the object.
    #[inline]
    pub fn object_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for ObjectRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Borrowed(_) => f.write_str("Borrowed(..)"),
            Self::Owned(_) => f.write_str("Owned(..)"),
        }
    }
}

// -----------------------------------------------------------------------------
// Value

/// A dynamic value.
///
/// Scalars map one-to-one onto Rust primitives. Text and bytes may borrow from
/// the object they were read from. Maps keep their entries in insertion order
/// and accept any value as a key; turning keys into text is left to the
/// token writer.
///
/// # Examples
///
/// ```
/// use lb_bind::value::{FromValue, ToValue, Value};
///
/// let numbers = vec![1_i32, 2, 3];
/// let value = numbers.to_value();
/// assert!(matches!(&value, Value::Seq(items) if items.len() == 3));
///
/// let back = Vec::<i64>::from_value(value).unwrap();
/// assert_eq!(back, [1, 2, 3]);
/// ```
#[derive(Debug)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Text(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
    Seq(Vec<Value<'a>>),
    Map(Vec<(Value<'a>, Value<'a>)>),
    Object(ObjectRef<'a>),
}

impl<'a> Value<'a> {
    /// Wraps a borrowed host object.
    #[inline]
    pub fn object<T: Any>(obj: &'a T) -> Self {
        Self::Object(ObjectRef::Borrowed(obj))
    }

    /// Wraps an owned host object.
    #[inline]
    pub fn owned<T: Any>(obj: T) -> Self {
        Self::Object(ObjectRef::Owned(Box::new(obj)))
    }

    #[inline]
    pub fn text(text: impl Into<Cow<'a, str>>) -> Self {
        Self::Text(text.into())
    }

    /// A short name for the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::I128(_) => "i128",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub fn as_object(&self) -> Option<&ObjectRef<'a>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns any integer variant widened to `i128`.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Self::I8(v) => v as i128,
            Self::I16(v) => v as i128,
            Self::I32(v) => v as i128,
            Self::I64(v) => v as i128,
            Self::I128(v) => v,
            Self::U8(v) => v as i128,
            Self::U16(v) => v as i128,
            Self::U32(v) => v as i128,
            Self::U64(v) => v as i128,
            _ => return None,
        })
    }

    /// Returns any numeric variant as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v as f64),
            Self::F64(v) => Some(v),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    /// Borrows this value, turning owned objects into borrowed ones.
    pub fn reborrow(&self) -> Value<'_> {
        match self {
            Self::Null => Value::Null,
            Self::Bool(v) => Value::Bool(*v),
            Self::Char(v) => Value::Char(*v),
            Self::I8(v) => Value::I8(*v),
            Self::I16(v) => Value::I16(*v),
            Self::I32(v) => Value::I32(*v),
            Self::I64(v) => Value::I64(*v),
            Self::I128(v) => Value::I128(*v),
            Self::U8(v) => Value::U8(*v),
            Self::U16(v) => Value::U16(*v),
            Self::U32(v) => Value::U32(*v),
            Self::U64(v) => Value::U64(*v),
            Self::F32(v) => Value::F32(*v),
            Self::F64(v) => Value::F64(*v),
            Self::Text(v) => Value::Text(Cow::Borrowed(v)),
            Self::Bytes(v) => Value::Bytes(Cow::Borrowed(v)),
            Self::Seq(items) => Value::Seq(items.iter().map(Value::reborrow).collect()),
            Self::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.reborrow(), v.reborrow()))
                    .collect(),
            ),
            Self::Object(obj) => Value::Object(ObjectRef::Borrowed(obj.as_any())),
        }
    }

    /// Detaches this value from the data it borrows.
    ///
    /// Fails on borrowed objects, which cannot be cloned generically.
    pub fn into_static(self) -> Result<Value<'static>, ValueError> {
        Ok(match self {
            Self::Null => Value::Null,
            Self::Bool(v) => Value::Bool(v),
            Self::Char(v) => Value::Char(v),
            Self::I8(v) => Value::I8(v),
            Self::I16(v) => Value::I16(v),
            Self::I32(v) => Value::I32(v),
            Self::I64(v) => Value::I64(v),
            Self::I128(v) => Value::I128(v),
            Self::U8(v) => Value::U8(v),
            Self::U16(v) => Value::U16(v),
            Self::U32(v) => Value::U32(v),
            Self::U64(v) => Value::U64(v),
            Self::F32(v) => Value::F32(v),
            Self::F64(v) => Value::F64(v),
            Self::Text(v) => Value::Text(Cow::Owned(v.into_owned())),
            Self::Bytes(v) => Value::Bytes(Cow::Owned(v.into_owned())),
            Self::Seq(items) => Value::Seq(
                items
                    .into_iter()
                    .map(Value::into_static)
                    .collect::<Result<_, _>>()?,
            ),
            Self::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| Ok((k.into_static()?, v.into_static()?)))
                    .collect::<Result<_, ValueError>>()?,
            ),
            Self::Object(ObjectRef::Owned(obj)) => Value::Object(ObjectRef::Owned(obj)),
            Self::Object(ObjectRef::Borrowed(_)) => {
                return Err(ValueError::Mismatch {
                    expected: "owned object",
                    found: "borrowed object",
                });
            }
        })
    }

    /// The declared type a value of this shape naturally has.
    ///
    /// Objects have no natural type; their class comes from the registry.
    pub fn natural_type(&self) -> Option<DeclaredType> {
        Some(match self {
            Self::Null => DeclaredType::class("Object"),
            Self::Bool(_) => DeclaredType::class("bool"),
            Self::Char(_) => DeclaredType::class("char"),
            Self::I8(_) => DeclaredType::class("i8"),
            Self::I16(_) => DeclaredType::class("i16"),
            Self::I32(_) => DeclaredType::class("i32"),
            Self::I64(_) => DeclaredType::class("i64"),
            Self::I128(_) => DeclaredType::class("i128"),
            Self::U8(_) => DeclaredType::class("u8"),
            Self::U16(_) => DeclaredType::class("u16"),
            Self::U32(_) => DeclaredType::class("u32"),
            Self::U64(_) => DeclaredType::class("u64"),
            Self::F32(_) => DeclaredType::class("f32"),
            Self::F64(_) => DeclaredType::class("f64"),
            Self::Text(_) => DeclaredType::class("String"),
            Self::Bytes(_) => DeclaredType::array(DeclaredType::class("u8")),
            Self::Seq(_) => DeclaredType::generic("List", [DeclaredType::class("Object")]),
            Self::Map(_) => DeclaredType::generic(
                "Map",
                [DeclaredType::class("Object"), DeclaredType::class("Object")],
            ),
            Self::Object(_) => return None,
        })
    }
}

impl PartialEq for Value<'_> {
    /// Objects never compare equal, everything else compares by variant and content.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::I128(a), Self::I128(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Seq(a), Self::Seq(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
