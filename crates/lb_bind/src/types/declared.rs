use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// TypeVariable

/// A declared type parameter, such as `T: Comparable<T>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVariable {
    pub name: Cow<'static, str>,
    pub bounds: Vec<DeclaredType>,
}

impl TypeVariable {
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
        }
    }

    #[inline]
    pub fn bounded(name: impl Into<Cow<'static, str>>, bounds: impl Into<Vec<DeclaredType>>) -> Self {
        Self {
            name: name.into(),
            bounds: bounds.into(),
        }
    }
}

// -----------------------------------------------------------------------------
// DeclaredType

/// A type reference as it appears in a declaration.
///
/// The set of categories is closed, so resolution never meets an
/// unrecognized one.
///
/// # Examples
///
/// ```
/// use lb_bind::types::DeclaredType;
///
/// // Map<String, Vec<T>>
/// let ty = DeclaredType::generic(
///     "Map",
///     [
///         DeclaredType::class("String"),
///         DeclaredType::generic("Vec", [DeclaredType::var("T")]),
///     ],
/// );
/// assert_eq!(ty.to_string(), "Map<String, Vec<T>>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    /// A class used without type arguments.
    Class(Cow<'static, str>),
    /// A class applied to type arguments.
    Parameterized {
        raw: Cow<'static, str>,
        args: Vec<DeclaredType>,
    },
    Array(Box<DeclaredType>),
    Variable(TypeVariable),
    /// `?`, `? extends Bound`.
    Wildcard { upper: Vec<DeclaredType> },
}

impl DeclaredType {
    #[inline]
    pub fn class(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Class(name.into())
    }

    #[inline]
    pub fn generic(
        raw: impl Into<Cow<'static, str>>,
        args: impl IntoIterator<Item = DeclaredType>,
    ) -> Self {
        Self::Parameterized {
            raw: raw.into(),
            args: args.into_iter().collect(),
        }
    }

    #[inline]
    pub fn array(element: DeclaredType) -> Self {
        Self::Array(Box::new(element))
    }

    /// An unbounded type variable.
    #[inline]
    pub fn var(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Variable(TypeVariable::new(name))
    }

    #[inline]
    pub fn wildcard() -> Self {
        Self::Wildcard { upper: Vec::new() }
    }

    #[inline]
    pub fn wildcard_extends(bound: DeclaredType) -> Self {
        Self::Wildcard { upper: alloc::vec![bound] }
    }

    /// The erased class name, if this reference names a class directly.
    pub fn raw_name(&self) -> Option<&str> {
        match self {
            Self::Class(name) | Self::Parameterized { raw: name, .. } => Some(name),
            _ => None,
        }
    }

    /// Replaces bare variables with the declared parameter of the same name.
    ///
    /// Only the variables found in this reference are filled in, not those
    /// inside the substituted bounds, so recursive bounds stay finite.
    pub(crate) fn with_declared_bounds(self, params: &[TypeVariable]) -> Self {
        match self {
            Self::Variable(var) if var.bounds.is_empty() => {
                match params.iter().find(|p| p.name == var.name) {
                    Some(param) => Self::Variable(param.clone()),
                    None => Self::Variable(var),
                }
            }
            Self::Parameterized { raw, args } => Self::Parameterized {
                raw,
                args: args
                    .into_iter()
                    .map(|arg| arg.with_declared_bounds(params))
                    .collect(),
            },
            Self::Array(element) => Self::Array(Box::new(element.with_declared_bounds(params))),
            Self::Wildcard { upper } => Self::Wildcard {
                upper: upper
                    .into_iter()
                    .map(|bound| bound.with_declared_bounds(params))
                    .collect(),
            },
            other => other,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(name) => f.write_str(name),
            Self::Parameterized { raw, args } => {
                write!(f, "{raw}<")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            Self::Array(element) => write!(f, "[{element}]"),
            Self::Variable(var) => f.write_str(&var.name),
            Self::Wildcard { upper } => match upper.first() {
                Some(bound) => write!(f, "? extends {bound}"),
                None => f.write_str("?"),
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Typed

/// Provides the [`DeclaredType`] of a Rust type.
///
/// Implemented for the standard types known to the built-in classes and,
/// through [`impl_object_value!`](crate::impl_object_value), for host objects.
pub trait Typed {
    fn declared_type() -> DeclaredType;
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::{DeclaredType, TypeVariable};

    #[test]
    fn display_forms() {
        assert_eq!(DeclaredType::array(DeclaredType::class("i32")).to_string(), "[i32]");
        assert_eq!(DeclaredType::wildcard().to_string(), "?");
        assert_eq!(
            DeclaredType::wildcard_extends(DeclaredType::class("Number")).to_string(),
            "? extends Number"
        );
    }

    #[test]
    fn declared_bounds_fill_nested_variables() {
        let params = [TypeVariable::bounded(
            "T",
            vec![DeclaredType::generic("Node", [DeclaredType::var("T")])],
        )];
        let ty = DeclaredType::generic("List", [DeclaredType::var("T")]).with_declared_bounds(&params);
        let DeclaredType::Parameterized { args, .. } = ty else {
            panic!("expected a parameterized type");
        };
        assert_eq!(args[0], DeclaredType::Variable(params[0].clone()));
    }
}
