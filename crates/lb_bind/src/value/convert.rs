use alloc::string::ToString;
use core::any::Any;

use super::{ObjectRef, Value};
use crate::error::ValueError;

// -----------------------------------------------------------------------------
// Traits

/// Borrows `self` as a [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value<'_>;
}

/// Converts `self` into an owned [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value<'static>;
}

/// Builds `Self` from a [`Value`], coercing compatible scalars.
pub trait FromValue: Sized {
    fn from_value(value: Value<'_>) -> Result<Self, ValueError>;
}

// -----------------------------------------------------------------------------
// Helpers

/// Takes an owned host object of type `T` out of a value.
///
/// Used by [`impl_object_value!`](crate::impl_object_value).
pub fn take_object<T: Any>(value: Value<'_>, expected: &'static str) -> Result<T, ValueError> {
    match value {
        Value::Object(ObjectRef::Owned(obj)) => match obj.downcast::<T>() {
            Ok(obj) => Ok(*obj),
            Err(_) => Err(ValueError::Mismatch {
                expected,
                found: "object of another class",
            }),
        },
        other => Err(mismatch(expected, &other)),
    }
}

#[inline]
pub(crate) fn mismatch(expected: &'static str, found: &Value<'_>) -> ValueError {
    ValueError::Mismatch {
        expected,
        found: found.kind_name(),
    }
}

/// Reads any integer-like value, including integral floats and numeric text.
pub(crate) fn integer_of(value: &Value<'_>, target: &'static str) -> Result<i128, ValueError> {
    if let Some(v) = value.as_i128() {
        return Ok(v);
    }
    match value {
        Value::F32(_) | Value::F64(_) => {
            let v = value.as_f64().unwrap_or(f64::NAN);
            if v.fract() == 0.0 && v >= i128::MIN as f64 && v <= i128::MAX as f64 {
                Ok(v as i128)
            } else {
                Err(ValueError::OutOfRange {
                    value: v.to_string(),
                    target,
                })
            }
        }
        Value::Text(text) => text.trim().parse::<i128>().map_err(|_| ValueError::Parse {
            text: text.to_string(),
            target,
        }),
        other => Err(mismatch(target, other)),
    }
}

/// Reads any numeric value, including numeric text, as `f64`.
pub(crate) fn float_of(value: &Value<'_>, target: &'static str) -> Result<f64, ValueError> {
    if let Some(v) = value.as_f64() {
        return Ok(v);
    }
    match value {
        Value::Text(text) => text.trim().parse::<f64>().map_err(|_| ValueError::Parse {
            text: text.to_string(),
            target,
        }),
        other => Err(mismatch(target, other)),
    }
}

// -----------------------------------------------------------------------------
// Object macro

/// Implements [`Typed`](crate::types::Typed), [`ToValue`], [`IntoValue`] and
/// [`FromValue`] for a host object type.
///
/// The class name defaults to the type name.
///
/// # Examples
///
/// ```
/// use lb_bind::impl_object_value;
/// use lb_bind::types::{DeclaredType, Typed};
///
/// struct Point { x: i32 }
/// impl_object_value!(Point);
///
/// struct Line;
/// impl_object_value!(Line as "geo.Line");
///
/// assert_eq!(Point::declared_type(), DeclaredType::class("Point"));
/// assert_eq!(Line::declared_type(), DeclaredType::class("geo.Line"));
/// ```
#[macro_export]
macro_rules! impl_object_value {
    ($ty:ty) => {
        $crate::impl_object_value!($ty as stringify!($ty));
    };
    ($ty:ty as $name:expr) => {
        impl $crate::types::Typed for $ty {
            fn declared_type() -> $crate::types::DeclaredType {
                $crate::types::DeclaredType::class($name)
            }
        }

        impl $crate::value::ToValue for $ty {
            #[inline]
            fn to_value(&self) -> $crate::value::Value<'_> {
                $crate::value::Value::object(self)
            }
        }

        impl $crate::value::IntoValue for $ty {
            #[inline]
            fn into_value(self) -> $crate::value::Value<'static> {
                $crate::value::Value::owned(self)
            }
        }

        impl $crate::value::FromValue for $ty {
            #[inline]
            fn from_value(
                value: $crate::value::Value<'_>,
            ) -> ::core::result::Result<Self, $crate::error::ValueError> {
                $crate::value::take_object::<$ty>(value, $name)
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{FromValue, IntoValue, ToValue, float_of, integer_of};
    use crate::error::ValueError;
    use crate::value::Value;

    #[derive(Debug, PartialEq)]
    struct Token(u32);
    crate::impl_object_value!(Token);

    #[test]
    fn objects_round_trip_through_owned_values() {
        let value = Token(9).into_value();
        assert_eq!(Token::from_value(value).unwrap(), Token(9));
    }

    #[test]
    fn borrowed_objects_are_rejected() {
        let token = Token(1);
        let err = Token::from_value(token.to_value()).unwrap_err();
        assert!(matches!(err, ValueError::Mismatch { expected: "Token", .. }));
    }

    #[test]
    fn integers_coerce_from_floats_and_text() {
        assert_eq!(integer_of(&Value::F64(4.0), "i32").unwrap(), 4);
        assert!(integer_of(&Value::F64(4.5), "i32").is_err());
        assert_eq!(integer_of(&Value::text(" 12 "), "i32").unwrap(), 12);
        assert!(integer_of(&Value::Bool(true), "i32").is_err());
        assert_eq!(float_of(&Value::text("2.5"), "f64").unwrap(), 2.5);
    }
}
