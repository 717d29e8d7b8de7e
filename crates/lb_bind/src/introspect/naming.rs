use alloc::borrow::Cow;
use alloc::string::String;

use super::AccessorKind;
use crate::class::MethodKind;
use crate::types::DeclaredType;

/// Lower-cases the first character of `name`.
///
/// A name starting with two upper-case characters is returned as is, so
/// abbreviations keep their casing.
///
/// ```
/// use lb_bind::introspect::decapitalize;
///
/// assert_eq!(decapitalize("Name"), "name");
/// assert_eq!(decapitalize("X"), "x");
/// assert_eq!(decapitalize("URL"), "URL");
/// assert_eq!(decapitalize("value"), "value");
/// ```
pub fn decapitalize(name: &str) -> Cow<'_, str> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Cow::Borrowed(name);
    };
    if !first.is_uppercase() {
        return Cow::Borrowed(name);
    }
    if chars.next().is_some_and(char::is_uppercase) {
        return Cow::Borrowed(name);
    }
    let mut out = String::with_capacity(name.len());
    out.extend(first.to_lowercase());
    out.push_str(&name[first.len_utf8()..]);
    Cow::Owned(out)
}

fn strip<'a>(name: &'a str, prefix: &str) -> Option<Cow<'a, str>> {
    let rest = name.strip_prefix(prefix)?;
    if let Some(snake) = rest.strip_prefix('_') {
        return (!snake.is_empty()).then(|| decapitalize(snake));
    }
    rest.chars()
        .next()
        .is_some_and(char::is_uppercase)
        .then(|| decapitalize(rest))
}

/// The accessor role and implicit property name of a method, if it is an
/// accessor.
///
/// Getters are named `getName` or `get_name`, boolean getters `isName`
/// (only when returning `bool`), setters `setName`.
///
/// ```
/// use lb_bind::class::{ClassDescriptor, MethodKind};
/// use lb_bind::introspect::{AccessorKind, accessor_name};
///
/// struct Link {
///     url: String,
/// }
///
/// let desc = ClassDescriptor::builder::<Link>("Link")
///     .getter("getURL", |l: &Link| l.url.clone())
///     .build();
/// let method = desc.method("getURL").unwrap();
/// let (kind, name) = accessor_name(method.name(), method.kind()).unwrap();
/// assert_eq!(kind, AccessorKind::Getter);
/// assert_eq!(name, "URL");
/// ```
pub fn accessor_name<'a>(name: &'a str, kind: &MethodKind) -> Option<(AccessorKind, Cow<'a, str>)> {
    match kind {
        MethodKind::Getter { returns, .. } => {
            if let Some(implicit) = strip(name, "get") {
                return Some((AccessorKind::Getter, implicit));
            }
            if matches!(returns, DeclaredType::Class(class) if class == "bool") {
                return strip(name, "is").map(|implicit| (AccessorKind::IsGetter, implicit));
            }
            None
        }
        MethodKind::Setter { .. } => strip(name, "set").map(|implicit| (AccessorKind::Setter, implicit)),
        MethodKind::Other { .. } => None,
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::{accessor_name, decapitalize, strip};
    use crate::class::{Getter, MethodKind};
    use crate::error::AccessError;
    use crate::introspect::AccessorKind;
    use crate::types::DeclaredType;
    use crate::value::Value;

    struct Nothing;

    impl Getter for Nothing {
        fn get<'a>(&self, _: &'a dyn core::any::Any) -> Result<Value<'a>, AccessError> {
            Ok(Value::Null)
        }
    }

    fn getter(returns: &'static str) -> MethodKind {
        MethodKind::Getter {
            returns: DeclaredType::class(returns),
            access: Arc::new(Nothing),
        }
    }

    #[test]
    fn decapitalization() {
        assert_eq!(decapitalize(""), "");
        assert_eq!(decapitalize("Name"), "name");
        assert_eq!(decapitalize("ÉTé"), "ÉTé");
        assert_eq!(decapitalize("Über"), "über");
        assert_eq!(decapitalize("IOStream"), "IOStream");
    }

    #[test]
    fn prefixes() {
        assert_eq!(strip("getName", "get").unwrap(), "name");
        assert_eq!(strip("get_name", "get").unwrap(), "name");
        assert!(strip("getaway", "get").is_none());
        assert!(strip("get", "get").is_none());
        assert!(strip("get_", "get").is_none());
    }

    #[test]
    fn is_getters_must_return_bool() {
        let (kind, name) = accessor_name("isActive", &getter("bool")).unwrap();
        assert_eq!(kind, AccessorKind::IsGetter);
        assert_eq!(name, "active");
        assert!(accessor_name("isActive", &getter("String")).is_none());
        assert!(accessor_name("size", &getter("u32")).is_none());
        assert!(accessor_name("setX", &MethodKind::Other { params: 1 }).is_none());
    }
}
