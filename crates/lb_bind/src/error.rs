//! The error taxonomy of the binding engine.
//!
//! Every failure surfaced by this crate is a [`BindError`]. Failures raised
//! while calling a member accessor are first captured as an [`AccessError`]
//! and then decorated with the owning class and property, so the raw
//! downcast or conversion failure never escapes on its own.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use core::error::Error as StdError;
use core::fmt;

use thiserror::Error;

/// A boxed, thread-safe error produced by user code.
pub type BoxedError = Box<dyn StdError + Send + Sync + 'static>;

// -----------------------------------------------------------------------------
// ValueError

/// A [`Value`](crate::value::Value) could not be converted to the requested type.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValueError {
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("{value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },
    #[error("cannot parse `{text}` as {target}")]
    Parse { text: String, target: &'static str },
}

// -----------------------------------------------------------------------------
// AccessError

/// A member accessor failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccessError {
    /// The target object is not an instance of the declaring class.
    #[error("target is not a `{expected}`")]
    TargetMismatch { expected: &'static str },
    /// The property has no accessor for the requested direction.
    #[error("nothing to {0} the property with")]
    NoAccessor(&'static str),
    #[error(transparent)]
    Value(#[from] ValueError),
    /// The accessor itself reported a failure.
    #[error(transparent)]
    Failed(BoxedError),
}

impl AccessError {
    /// Wraps a failure reported by user code.
    #[inline]
    pub fn failed(err: impl Into<BoxedError>) -> Self {
        Self::Failed(err.into())
    }
}

// -----------------------------------------------------------------------------
// SourceShape

/// The shape of an input value an object was asked to be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceShape {
    Map,
    Text,
    Integer,
}

impl fmt::Display for SourceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Map => "no arguments",
            Self::Text => "a single text argument",
            Self::Integer => "a single integer argument",
        })
    }
}

// -----------------------------------------------------------------------------
// BindError

/// An error raised while resolving, introspecting, reading or writing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BindError {
    #[error("unknown class `{0}`")]
    UnknownClass(Cow<'static, str>),
    #[error("`{class}` declares {expected} type parameter(s) but {found} were given")]
    TypeArity {
        class: String,
        expected: usize,
        found: usize,
    },
    #[error("no class is registered for a value declared as `{0}`")]
    UnregisteredType(String),
    #[error("`{0}` is abstract and has no registered handler")]
    AbstractType(String),
    #[error("`{class}` has no constructor taking {shape}")]
    NoConstructor { class: String, shape: SourceShape },
    #[error("cannot access `{class}.{property}`: {}", root_cause(.cause))]
    Access {
        class: String,
        property: String,
        #[source]
        cause: AccessError,
    },
    #[error("unknown property `{property}` for `{class}`")]
    UnknownProperty { class: String, property: String },
    #[error("`{constant}` is not a constant of `{class}`")]
    UnknownConstant { class: String, constant: String },
    #[error("handler for `{class}` failed: {cause}")]
    Handler {
        class: String,
        #[source]
        cause: BoxedError,
    },
    #[error(transparent)]
    Value(#[from] ValueError),
    /// Reported by the token reader or writer.
    #[error("{0}")]
    Format(String),
}

impl BindError {
    /// Decorates an accessor failure with its class and property.
    #[inline]
    pub fn access(class: impl Into<String>, property: impl Into<String>, cause: AccessError) -> Self {
        Self::Access {
            class: class.into(),
            property: property.into(),
            cause,
        }
    }

    /// Wraps a failure reported by a custom handler.
    #[inline]
    pub fn handler(class: impl Into<String>, cause: impl Into<BoxedError>) -> Self {
        Self::Handler {
            class: class.into(),
            cause: cause.into(),
        }
    }
}

/// Follows the `source` chain down to the innermost error.
pub fn root_cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{AccessError, BindError, SourceShape, ValueError};

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct Inner;

    #[test]
    fn access_reports_root_cause() {
        let cause = AccessError::failed(Outer(Inner));
        let err = BindError::access("Point", "x", cause);
        assert_eq!(err.to_string(), "cannot access `Point.x`: disk on fire");
    }

    #[test]
    fn access_reports_value_error() {
        let cause = AccessError::from(ValueError::Mismatch {
            expected: "i32",
            found: "text",
        });
        let err = BindError::access("Point", "x", cause);
        assert_eq!(
            err.to_string(),
            "cannot access `Point.x`: expected i32, found text"
        );
    }

    #[test]
    fn missing_constructor_names_the_shape() {
        let err = BindError::NoConstructor {
            class: "Point".into(),
            shape: SourceShape::Text,
        };
        assert_eq!(
            err.to_string(),
            "`Point` has no constructor taking a single text argument"
        );
    }
}
