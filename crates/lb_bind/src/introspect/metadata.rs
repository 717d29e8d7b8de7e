use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use lb_utils::hash::HashMap;

use crate::class::{
    Alias, ClassDescriptor, Ignore, IgnoreProperties, Include, Markers, Member, PropertyOrder,
    Rename,
};

// -----------------------------------------------------------------------------
// MetadataSource

/// An explicit name request on a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplicitName {
    /// Bind under this name.
    Rename(Cow<'static, str>),
    /// Keep the implicit name, but always include the member.
    Include,
}

/// Explicit binding metadata, keyed by class and member.
///
/// `class` is always the class declaring `member`. Every method defaults to
/// "no metadata".
pub trait MetadataSource: Send + Sync {
    fn is_ignored(&self, class: &ClassDescriptor, member: Member<'_>) -> bool {
        let _ = (class, member);
        false
    }

    fn explicit_name(&self, class: &ClassDescriptor, member: Member<'_>) -> Option<ExplicitName> {
        let _ = (class, member);
        None
    }

    /// Extra names accepted for `member` when reading.
    fn aliases(&self, class: &ClassDescriptor, member: Member<'_>) -> Vec<Cow<'static, str>> {
        let _ = (class, member);
        Vec::new()
    }

    /// Property names of `class` to drop, and to skip silently when reading.
    fn ignored_names(&self, class: &ClassDescriptor) -> Vec<Cow<'static, str>> {
        let _ = class;
        Vec::new()
    }

    /// Names to write first, in this order.
    fn property_order(&self, class: &ClassDescriptor) -> Option<Vec<Cow<'static, str>>> {
        let _ = class;
        None
    }
}

/// Ignores all explicit metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataSource for NoMetadata {}

// -----------------------------------------------------------------------------
// DeclaredMarkers

/// Reads the [`Markers`] attached to descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredMarkers;

fn ignored_by(markers: &Markers) -> bool {
    markers.contains::<Ignore>()
}

fn name_from(markers: &Markers) -> Option<ExplicitName> {
    if let Some(rename) = markers.get::<Rename>() {
        return Some(if rename.name().is_empty() {
            ExplicitName::Include
        } else {
            ExplicitName::Rename(rename.0.clone())
        });
    }
    markers.contains::<Include>().then_some(ExplicitName::Include)
}

fn aliases_from(markers: &Markers) -> Vec<Cow<'static, str>> {
    markers.get::<Alias>().map(|a| a.0.clone()).unwrap_or_default()
}

fn ignored_names_from(markers: &Markers) -> Vec<Cow<'static, str>> {
    markers
        .get::<IgnoreProperties>()
        .map(|i| i.0.clone())
        .unwrap_or_default()
}

fn order_from(markers: &Markers) -> Option<Vec<Cow<'static, str>>> {
    markers.get::<PropertyOrder>().map(|o| o.0.clone())
}

impl MetadataSource for DeclaredMarkers {
    fn is_ignored(&self, _: &ClassDescriptor, member: Member<'_>) -> bool {
        ignored_by(member.markers())
    }

    fn explicit_name(&self, _: &ClassDescriptor, member: Member<'_>) -> Option<ExplicitName> {
        name_from(member.markers())
    }

    fn aliases(&self, _: &ClassDescriptor, member: Member<'_>) -> Vec<Cow<'static, str>> {
        aliases_from(member.markers())
    }

    fn ignored_names(&self, class: &ClassDescriptor) -> Vec<Cow<'static, str>> {
        ignored_names_from(class.markers())
    }

    fn property_order(&self, class: &ClassDescriptor) -> Option<Vec<Cow<'static, str>>> {
        order_from(class.markers())
    }
}

// -----------------------------------------------------------------------------
// MarkerOverrides

/// Markers layered over the declared ones, without touching the descriptors.
///
/// Overrides win over declared markers of the same type.
///
/// # Examples
///
/// ```
/// use lb_bind::class::{ClassDescriptor, Ignore, Member};
/// use lb_bind::introspect::{MarkerOverrides, MetadataSource};
///
/// struct Point {
///     x: i32,
/// }
///
/// let desc = ClassDescriptor::builder::<Point>("Point")
///     .field("x", |p| &p.x, |p| &mut p.x)
///     .build();
/// let x = Member::Field(desc.field("x").unwrap());
///
/// let overrides = MarkerOverrides::new().member("Point", "x", Ignore);
/// assert!(overrides.is_ignored(&desc, x));
/// ```
#[derive(Clone, Default)]
pub struct MarkerOverrides {
    classes: HashMap<String, Markers>,
    members: HashMap<(String, String), Markers>,
}

impl MarkerOverrides {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class-level marker.
    pub fn class<M>(mut self, class: impl Into<String>, marker: M) -> Self
    where
        M: core::any::Any + Send + Sync,
    {
        self.classes.entry(class.into()).or_default().insert(marker);
        self
    }

    /// Adds a marker to the member `member` declared by `class`.
    pub fn member<M>(mut self, class: impl Into<String>, member: impl Into<String>, marker: M) -> Self
    where
        M: core::any::Any + Send + Sync,
    {
        self.members
            .entry((class.into(), member.into()))
            .or_default()
            .insert(marker);
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.members.is_empty()
    }

    fn class_markers<'a>(&'a self, class: &'a ClassDescriptor) -> Cow<'a, Markers> {
        match self.classes.get(class.name()) {
            Some(overrides) => Cow::Owned(class.markers().overlaid(overrides)),
            None => Cow::Borrowed(class.markers()),
        }
    }

    fn member_markers<'a>(&'a self, class: &ClassDescriptor, member: Member<'a>) -> Cow<'a, Markers> {
        let key = (String::from(class.name()), String::from(member.name()));
        match self.members.get(&key) {
            Some(overrides) => Cow::Owned(member.markers().overlaid(overrides)),
            None => Cow::Borrowed(member.markers()),
        }
    }
}

impl MetadataSource for MarkerOverrides {
    fn is_ignored(&self, class: &ClassDescriptor, member: Member<'_>) -> bool {
        ignored_by(&self.member_markers(class, member))
    }

    fn explicit_name(&self, class: &ClassDescriptor, member: Member<'_>) -> Option<ExplicitName> {
        name_from(&self.member_markers(class, member))
    }

    fn aliases(&self, class: &ClassDescriptor, member: Member<'_>) -> Vec<Cow<'static, str>> {
        aliases_from(&self.member_markers(class, member))
    }

    fn ignored_names(&self, class: &ClassDescriptor) -> Vec<Cow<'static, str>> {
        ignored_names_from(&self.class_markers(class))
    }

    fn property_order(&self, class: &ClassDescriptor) -> Option<Vec<Cow<'static, str>>> {
        order_from(&self.class_markers(class))
    }
}

impl fmt::Debug for MarkerOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerOverrides")
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::{MarkerOverrides, MetadataSource};
    use crate::class::{ClassDescriptor, IgnoreProperties, PropertyOrder};

    #[test]
    fn class_overrides_layer_over_declared_markers() {
        let desc = ClassDescriptor::declare("Record")
            .class_marker(PropertyOrder::of(["b", "a"]))
            .build();

        let empty = MarkerOverrides::new();
        assert_eq!(empty.property_order(&desc).unwrap(), ["b", "a"]);
        assert!(empty.ignored_names(&desc).is_empty());

        let overrides = MarkerOverrides::new()
            .class("Record", PropertyOrder::of(["c"]))
            .class("Record", IgnoreProperties::of(["d"]));
        assert_eq!(overrides.property_order(&desc).unwrap(), ["c"]);
        assert_eq!(overrides.ignored_names(&desc), ["d"]);

        // Other classes keep their declared markers.
        let other = ClassDescriptor::declare("Other").build();
        assert_eq!(overrides.property_order(&other), None::<Vec<_>>);
    }
}
