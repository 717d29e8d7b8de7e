//! Conversions for the standard library types known to the built-in classes.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::{HashMap, HashSet};

use super::convert::{float_of, integer_of, mismatch};
use super::{FromValue, IntoValue, ToValue, Value};
use crate::error::ValueError;
use crate::types::{DeclaredType, Typed};

// -----------------------------------------------------------------------------
// Scalars

macro_rules! impl_integer {
    ($($ty:ident => $variant:ident),* $(,)?) => {$(
        impl Typed for $ty {
            #[inline]
            fn declared_type() -> DeclaredType {
                DeclaredType::class(stringify!($ty))
            }
        }

        impl ToValue for $ty {
            #[inline]
            fn to_value(&self) -> Value<'_> {
                Value::$variant(*self)
            }
        }

        impl IntoValue for $ty {
            #[inline]
            fn into_value(self) -> Value<'static> {
                Value::$variant(self)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
                if let Value::$variant(v) = value {
                    return Ok(v);
                }
                let wide = integer_of(&value, stringify!($ty))?;
                <$ty>::try_from(wide).map_err(|_| ValueError::OutOfRange {
                    value: wide.to_string(),
                    target: stringify!($ty),
                })
            }
        }
    )*};
}

impl_integer! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

macro_rules! impl_float {
    ($($ty:ident => $variant:ident),* $(,)?) => {$(
        impl Typed for $ty {
            #[inline]
            fn declared_type() -> DeclaredType {
                DeclaredType::class(stringify!($ty))
            }
        }

        impl ToValue for $ty {
            #[inline]
            fn to_value(&self) -> Value<'_> {
                Value::$variant(*self)
            }
        }

        impl IntoValue for $ty {
            #[inline]
            fn into_value(self) -> Value<'static> {
                Value::$variant(self)
            }
        }

        impl FromValue for $ty {
            #[inline]
            fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
                float_of(&value, stringify!($ty)).map(|v| v as $ty)
            }
        }
    )*};
}

impl_float! {
    f32 => F32,
    f64 => F64,
}

impl Typed for bool {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::class("bool")
    }
}

impl ToValue for bool {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl IntoValue for bool {
    #[inline]
    fn into_value(self) -> Value<'static> {
        Value::Bool(self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::Text(text) => match text.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(ValueError::Parse {
                    text: text.into_owned(),
                    target: "bool",
                }),
            },
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl Typed for char {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::class("char")
    }
}

impl ToValue for char {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::Char(*self)
    }
}

impl IntoValue for char {
    #[inline]
    fn into_value(self) -> Value<'static> {
        Value::Char(self)
    }
}

impl FromValue for char {
    fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
        match value {
            Value::Char(v) => Ok(v),
            Value::Text(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ValueError::Parse {
                        text: text.into_owned(),
                        target: "char",
                    }),
                }
            }
            other => Err(mismatch("char", &other)),
        }
    }
}

impl Typed for () {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::class("()")
    }
}

impl ToValue for () {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::Null
    }
}

impl FromValue for () {
    #[inline]
    fn from_value(_: Value<'_>) -> Result<Self, ValueError> {
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Text

fn text_of<'a>(value: Value<'a>, target: &'static str) -> Result<Cow<'a, str>, ValueError> {
    Ok(match value {
        Value::Text(text) => text,
        Value::Char(c) => Cow::Owned(c.to_string()),
        Value::Bool(v) => Cow::Owned(v.to_string()),
        Value::F32(v) => Cow::Owned(v.to_string()),
        Value::F64(v) => Cow::Owned(v.to_string()),
        ref other => match other.as_i128() {
            Some(v) => Cow::Owned(v.to_string()),
            None => return Err(mismatch(target, other)),
        },
    })
}

impl Typed for String {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::class("String")
    }
}

impl ToValue for String {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::Text(Cow::Borrowed(self))
    }
}

impl IntoValue for String {
    #[inline]
    fn into_value(self) -> Value<'static> {
        Value::Text(Cow::Owned(self))
    }
}

impl FromValue for String {
    #[inline]
    fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
        text_of(value, "String").map(Cow::into_owned)
    }
}

macro_rules! impl_text_sequence {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl Typed for $ty {
            #[inline]
            fn declared_type() -> DeclaredType {
                DeclaredType::class($name)
            }
        }

        impl ToValue for $ty {
            #[inline]
            fn to_value(&self) -> Value<'_> {
                Value::Text(Cow::Borrowed(&**self))
            }
        }

        impl IntoValue for $ty {
            #[inline]
            fn into_value(self) -> Value<'static> {
                Value::Text(Cow::Owned(self.to_string()))
            }
        }

        impl FromValue for $ty {
            #[inline]
            fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
                text_of(value, $name).map(|text| <$ty>::from(text.into_owned()))
            }
        }
    )*};
}

impl_text_sequence! {
    Box<str> => "Box<str>",
    Arc<str> => "Arc<str>",
    Cow<'static, str> => "Cow<str>",
}

// -----------------------------------------------------------------------------
// Option

impl<T: Typed> Typed for Option<T> {
    #[inline]
    fn declared_type() -> DeclaredType {
        T::declared_type()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    #[inline]
    fn into_value(self) -> Value<'static> {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    #[inline]
    fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// -----------------------------------------------------------------------------
// Sequences

fn elements_of<T: FromValue>(value: Value<'_>, target: &'static str) -> Result<Vec<T>, ValueError> {
    match value {
        Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
        Value::Bytes(bytes) => bytes.iter().map(|b| T::from_value(Value::U8(*b))).collect(),
        other => Err(mismatch(target, &other)),
    }
}

macro_rules! impl_sequence {
    ($($ty:ident $(: $bound:path)* => $name:literal),* $(,)?) => {$(
        impl<T: Typed> Typed for $ty<T> {
            #[inline]
            fn declared_type() -> DeclaredType {
                DeclaredType::generic($name, [T::declared_type()])
            }
        }

        impl<T: ToValue> ToValue for $ty<T> {
            #[inline]
            fn to_value(&self) -> Value<'_> {
                Value::Seq(self.iter().map(ToValue::to_value).collect())
            }
        }

        impl<T: IntoValue> IntoValue for $ty<T> {
            #[inline]
            fn into_value(self) -> Value<'static> {
                Value::Seq(self.into_iter().map(IntoValue::into_value).collect())
            }
        }

        impl<T: FromValue $(+ $bound)*> FromValue for $ty<T> {
            #[inline]
            fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
                elements_of::<T>(value, $name).map(|items| items.into_iter().collect())
            }
        }
    )*};
}

impl_sequence! {
    Vec => "Vec",
    VecDeque => "VecDeque",
    BTreeSet: Ord => "BTreeSet",
}

impl<T: Typed, S> Typed for HashSet<T, S> {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::generic("HashSet", [T::declared_type()])
    }
}

impl<T: ToValue, S> ToValue for HashSet<T, S> {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::Seq(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: IntoValue, S> IntoValue for HashSet<T, S> {
    #[inline]
    fn into_value(self) -> Value<'static> {
        Value::Seq(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue + Eq + Hash, S: BuildHasher + Default> FromValue for HashSet<T, S> {
    #[inline]
    fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
        elements_of::<T>(value, "HashSet").map(|items| items.into_iter().collect())
    }
}

impl<T: Typed> Typed for Box<[T]> {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::array(T::declared_type())
    }
}

impl<T: ToValue> ToValue for Box<[T]> {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::Seq(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for Box<[T]> {
    #[inline]
    fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
        elements_of::<T>(value, "array").map(Vec::into_boxed_slice)
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::array(T::declared_type())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::Seq(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: IntoValue, const N: usize> IntoValue for [T; N] {
    #[inline]
    fn into_value(self) -> Value<'static> {
        Value::Seq(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue, const N: usize> FromValue for [T; N] {
    fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
        let items = elements_of::<T>(value, "array")?;
        let len = items.len();
        <[T; N]>::try_from(items).map_err(|_| ValueError::OutOfRange {
            value: len.to_string(),
            target: "fixed-size array length",
        })
    }
}

// -----------------------------------------------------------------------------
// Maps

fn entries_of<K: FromValue, V: FromValue>(
    value: Value<'_>,
    target: &'static str,
) -> Result<Vec<(K, V)>, ValueError> {
    match value {
        Value::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect(),
        other => Err(mismatch(target, &other)),
    }
}

impl<K: Typed, V: Typed> Typed for BTreeMap<K, V> {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::generic("BTreeMap", [K::declared_type(), V::declared_type()])
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for BTreeMap<K, V> {
    #[inline]
    fn into_value(self) -> Value<'static> {
        Value::Map(
            self.into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value()))
                .collect(),
        )
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    #[inline]
    fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
        entries_of::<K, V>(value, "BTreeMap").map(|entries| entries.into_iter().collect())
    }
}

impl<K: Typed, V: Typed, S> Typed for HashMap<K, V, S> {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::generic("HashMap", [K::declared_type(), V::declared_type()])
    }
}

impl<K: ToValue, V: ToValue, S> ToValue for HashMap<K, V, S> {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

impl<K: IntoValue, V: IntoValue, S> IntoValue for HashMap<K, V, S> {
    #[inline]
    fn into_value(self) -> Value<'static> {
        Value::Map(
            self.into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value()))
                .collect(),
        )
    }
}

impl<K, V, S> FromValue for HashMap<K, V, S>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
    S: BuildHasher + Default,
{
    #[inline]
    fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
        entries_of::<K, V>(value, "HashMap").map(|entries| entries.into_iter().collect())
    }
}

// -----------------------------------------------------------------------------
// Dynamic values

impl Typed for Value<'static> {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::class("Value")
    }
}

impl ToValue for Value<'static> {
    /// A dynamic value is a tree node in its own right.
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::object(self)
    }
}

impl IntoValue for Value<'static> {
    #[inline]
    fn into_value(self) -> Value<'static> {
        Value::owned(self)
    }
}

impl FromValue for Value<'static> {
    fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
        match value {
            Value::Object(super::ObjectRef::Owned(obj)) => match obj.downcast::<Value<'static>>() {
                Ok(node) => Ok(*node),
                Err(obj) => Ok(Value::Object(super::ObjectRef::Owned(obj))),
            },
            other => other.into_static(),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use std::collections::HashMap;

    use crate::error::ValueError;
    use crate::types::{DeclaredType, Typed};
    use crate::value::{FromValue, IntoValue, ToValue, Value};

    #[test]
    fn narrowing_checks_range() {
        assert_eq!(u8::from_value(Value::I64(200)).unwrap(), 200);
        assert!(matches!(
            u8::from_value(Value::I64(300)),
            Err(ValueError::OutOfRange { target: "u8", .. })
        ));
        assert_eq!(i16::from_value(Value::text("-7")).unwrap(), -7);
    }

    #[test]
    fn text_accepts_scalars() {
        assert_eq!(String::from_value(Value::I32(5)).unwrap(), "5");
        assert_eq!(String::from_value(Value::Char('z')).unwrap(), "z");
        assert_eq!(&*Arc::<str>::from_value(Value::text("hi")).unwrap(), "hi");
        assert!(String::from_value(Value::Seq(Vec::new())).is_err());
    }

    #[test]
    fn char_needs_exactly_one() {
        assert_eq!(char::from_value(Value::text("q")).unwrap(), 'q');
        assert!(char::from_value(Value::text("qq")).is_err());
    }

    #[test]
    fn maps_convert_keys() {
        let value = Value::Map(vec![
            (Value::text("1"), Value::text("one")),
            (Value::text("2"), Value::text("two")),
        ]);
        let map = BTreeMap::<i32, String>::from_value(value).unwrap();
        assert_eq!(map[&2], "two");

        let map: HashMap<String, u8> = [(String::from("a"), 1)].into_iter().collect();
        let Value::Map(entries) = map.to_value() else {
            panic!("expected a map");
        };
        assert_eq!(entries, [(Value::Text(Cow::Borrowed("a")), Value::U8(1))]);
    }

    #[test]
    fn bytes_feed_sequences() {
        let value = Value::Bytes(Cow::Owned(vec![1, 2]));
        assert_eq!(Vec::<u8>::from_value(value).unwrap(), [1, 2]);
        assert!(<[u8; 3]>::from_value(Value::Bytes(Cow::Owned(vec![1]))).is_err());
    }

    #[test]
    fn declared_types_follow_rust_types() {
        assert_eq!(
            HashMap::<String, Vec<i32>>::declared_type(),
            DeclaredType::generic(
                "HashMap",
                [
                    DeclaredType::class("String"),
                    DeclaredType::generic("Vec", [DeclaredType::class("i32")]),
                ]
            )
        );
        assert_eq!(
            Option::<[u8; 4]>::declared_type(),
            DeclaredType::array(DeclaredType::class("u8"))
        );
    }

    #[test]
    fn dynamic_values_unwrap_themselves() {
        let node = Value::Seq(vec![Value::I32(1)]).into_value();
        assert_eq!(
            Value::from_value(node).unwrap(),
            Value::Seq(vec![Value::I32(1)])
        );
    }
}
