//! Object-valued built-in classes: dates and identifier types.
//!
//! Dates are written as milliseconds since the Unix epoch. Identifier
//! types are written through their textual form.

use alloc::string::{String, ToString};
use core::any::Any;
use core::net::{IpAddr, SocketAddr};
use core::time::Duration;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use super::convert::{integer_of, mismatch};
use super::{FromValue, IntoValue, ObjectRef, ToValue, Value};
use crate::error::ValueError;
use crate::types::{DeclaredType, Typed};

// -----------------------------------------------------------------------------
// Dates

/// Converts a date object into its written form.
pub(crate) fn date_to_value(obj: &dyn Any) -> Option<Value<'static>> {
    let time = obj.downcast_ref::<SystemTime>()?;
    Some(match time.duration_since(UNIX_EPOCH) {
        Ok(after) => Value::I64(i64::try_from(after.as_millis()).unwrap_or(i64::MAX)),
        Err(before) => Value::I64(-i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX)),
    })
}

/// Builds a date object from epoch milliseconds.
pub(crate) fn date_from_value(value: Value<'_>) -> Result<Value<'static>, ValueError> {
    SystemTime::from_value(value).map(Value::owned)
}

fn system_time_from_millis(millis: i128) -> Result<SystemTime, ValueError> {
    let out_of_range = || ValueError::OutOfRange {
        value: millis.to_string(),
        target: "SystemTime",
    };
    let magnitude = u64::try_from(millis.unsigned_abs()).map_err(|_| out_of_range())?;
    let offset = Duration::from_millis(magnitude);
    let time = if millis >= 0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    };
    time.ok_or_else(out_of_range)
}

impl Typed for SystemTime {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::class("SystemTime")
    }
}

impl ToValue for SystemTime {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::object(self)
    }
}

impl IntoValue for SystemTime {
    #[inline]
    fn into_value(self) -> Value<'static> {
        Value::owned(self)
    }
}

impl FromValue for SystemTime {
    fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
        match value {
            Value::Object(obj) => obj
                .downcast_ref::<SystemTime>()
                .copied()
                .ok_or(ValueError::Mismatch {
                    expected: "SystemTime",
                    found: "object of another class",
                }),
            other => system_time_from_millis(integer_of(&other, "SystemTime")?),
        }
    }
}

// -----------------------------------------------------------------------------
// Identifiers

/// Returns the textual form of an identifier object.
pub(crate) fn identifier_to_text(obj: &dyn Any) -> Option<String> {
    if let Some(path) = obj.downcast_ref::<PathBuf>() {
        return Some(path.to_string_lossy().into_owned());
    }
    if let Some(ip) = obj.downcast_ref::<IpAddr>() {
        return Some(ip.to_string());
    }
    obj.downcast_ref::<SocketAddr>().map(ToString::to_string)
}

/// Parses the identifier class `class` from text.
pub(crate) fn identifier_from_text(class: &str, value: Value<'_>) -> Result<Value<'static>, ValueError> {
    match class {
        "PathBuf" => PathBuf::from_value(value).map(Value::owned),
        "IpAddr" => IpAddr::from_value(value).map(Value::owned),
        "SocketAddr" => SocketAddr::from_value(value).map(Value::owned),
        _ => Err(ValueError::Mismatch {
            expected: "identifier class",
            found: "unknown class",
        }),
    }
}

macro_rules! impl_identifier {
    ($($ty:ident),* $(,)?) => {$(
        impl Typed for $ty {
            #[inline]
            fn declared_type() -> DeclaredType {
                DeclaredType::class(stringify!($ty))
            }
        }

        impl ToValue for $ty {
            #[inline]
            fn to_value(&self) -> Value<'_> {
                Value::object(self)
            }
        }

        impl IntoValue for $ty {
            #[inline]
            fn into_value(self) -> Value<'static> {
                Value::owned(self)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value<'_>) -> Result<Self, ValueError> {
                match value {
                    Value::Object(ObjectRef::Owned(obj)) => obj
                        .downcast::<$ty>()
                        .map(|obj| *obj)
                        .map_err(|_| ValueError::Mismatch {
                            expected: stringify!($ty),
                            found: "object of another class",
                        }),
                    Value::Object(obj) => obj
                        .downcast_ref::<$ty>()
                        .cloned()
                        .ok_or(ValueError::Mismatch {
                            expected: stringify!($ty),
                            found: "object of another class",
                        }),
                    Value::Text(text) => text.parse::<$ty>().map_err(|_| ValueError::Parse {
                        text: text.into_owned(),
                        target: stringify!($ty),
                    }),
                    other => Err(mismatch(stringify!($ty), &other)),
                }
            }
        }
    )*};
}

impl_identifier!(PathBuf, IpAddr, SocketAddr);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::net::IpAddr;
    use core::time::Duration;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{date_from_value, date_to_value, identifier_from_text, identifier_to_text};
    use crate::value::{FromValue, Value};

    #[test]
    fn dates_use_epoch_millis() {
        let time = UNIX_EPOCH + Duration::from_millis(1_500);
        assert_eq!(date_to_value(&time), Some(Value::I64(1_500)));

        let back = date_from_value(Value::I64(1_500)).unwrap();
        assert_eq!(SystemTime::from_value(back).unwrap(), time);

        let before = date_from_value(Value::I64(-20)).unwrap();
        assert_eq!(date_to_value(before.as_object().unwrap().as_any()), Some(Value::I64(-20)));
    }

    #[test]
    fn identifiers_use_text() {
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        assert_eq!(identifier_to_text(&ip).as_deref(), Some("10.0.0.1"));

        let path = identifier_from_text("PathBuf", Value::text("/tmp/x")).unwrap();
        assert_eq!(PathBuf::from_value(path).unwrap(), PathBuf::from("/tmp/x"));
        assert!(identifier_from_text("IpAddr", Value::text("nope")).is_err());
    }
}
